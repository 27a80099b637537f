//! Deterministic query variable naming
//!
//! A child variable is named after its parent and the local name of the key
//! it is bound under: `root` + `·` + `hair_color` gives `?root·hair_color`.
//! Names are a pure function of the document's structure, so translating the
//! same document twice yields the same variables.

use oxrdf::Variable;
use rustc_hash::FxHashMap;

/// Default name of the root variable
pub const DEFAULT_ROOT: &str = "root";

/// Default separator between name segments (U+00B7, valid inside SPARQL names)
pub const DEFAULT_SEPARATOR: &str = "·";

/// Naming scheme shared by every production
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNaming {
    root: String,
    separator: String,
}

impl VariableNaming {
    /// Naming with a custom root name and separator.
    ///
    /// The root is sanitized to a SPARQL name. The separator keeps only its
    /// `·` characters, which never survive segment sanitizing, so no two key paths
    /// share a name.
    pub fn new(root: &str, separator: &str) -> Self {
        let root = sanitize(root);
        let separator: String = separator.chars().filter(|c| *c == '\u{B7}').collect();
        Self {
            root: if root.is_empty() { DEFAULT_ROOT.to_string() } else { root },
            separator: if separator.is_empty() {
                DEFAULT_SEPARATOR.to_string()
            } else {
                separator
            },
        }
    }

    /// The root variable
    pub fn root(&self) -> Variable {
        Variable::new_unchecked(self.root.clone())
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Variable for `segment` under `parent`
    pub fn under(&self, parent: &Variable, segment: &str) -> Variable {
        Variable::new_unchecked(format!(
            "{}{}{}",
            parent.as_str(),
            self.separator,
            sanitize(segment)
        ))
    }
}

impl Default for VariableNaming {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT, DEFAULT_SEPARATOR)
    }
}

/// Local name of an IRI: the segment after the last `#`, `/` or `:`.
///
/// Falls back to the whole IRI when that segment is empty.
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(|c| c == '#' || c == '/' || c == ':') {
        Some(pos) if pos + 1 < iri.len() => &iri[pos + 1..],
        _ => iri,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect()
}

/// Hands out distinct child segments among the siblings of one node object.
///
/// The first use of a local name keeps it; later uses get `_2`, `_3`, ...
#[derive(Debug, Default)]
pub struct VariableRegistry {
    used: FxHashMap<String, usize>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a segment for `name`, disambiguating repeats
    pub fn claim(&mut self, name: &str) -> String {
        let name = sanitize(name);
        let count = self.used.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name
        } else {
            let candidate = format!("{}_{}", name, count);
            // A literal key may already have produced the suffixed name.
            if self.used.contains_key(&candidate) {
                return self.claim(&candidate);
            }
            self.used.insert(candidate.clone(), 1);
            candidate
        }
    }
}
