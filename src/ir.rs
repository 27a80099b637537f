//! Intermediate result templates
//!
//! An intermediate result mirrors the shape of the JSON-LD query it was parsed
//! from, with placeholders replaced by the variables that will carry their
//! values. A later binding phase zips query solutions back into this shape.

use indexmap::IndexMap;
use oxrdf::Variable;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A node of the intermediate result tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum IntermediateResult {
    /// A node, value, graph or list object; keys keep source order
    Object {
        entries: IndexMap<String, IntermediateResult>,
    },
    /// A container: one template applied to every binding of `variable`
    Array {
        #[serde(serialize_with = "serialize_variable")]
        variable: Variable,
        template: Box<IntermediateResult>,
    },
    /// An `@id` to be filled with the bound term's IRI
    NamePlaceholder {
        #[serde(serialize_with = "serialize_variable")]
        variable: Variable,
    },
    /// A value to be filled with the bound term's native value
    NativePlaceholder {
        #[serde(serialize_with = "serialize_variable")]
        variable: Variable,
    },
    /// A value known up front, carried through verbatim
    NativeValue { value: Value },
}

impl IntermediateResult {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, IntermediateResult)>,
    {
        IntermediateResult::Object {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn array(variable: Variable, template: IntermediateResult) -> Self {
        IntermediateResult::Array {
            variable,
            template: Box::new(template),
        }
    }

    pub fn name_placeholder(variable: Variable) -> Self {
        IntermediateResult::NamePlaceholder { variable }
    }

    pub fn native_placeholder(variable: Variable) -> Self {
        IntermediateResult::NativePlaceholder { variable }
    }

    pub fn native_value(value: impl Into<Value>) -> Self {
        IntermediateResult::NativeValue {
            value: value.into(),
        }
    }

    /// Variables of every placeholder in the tree, depth first
    pub fn placeholder_variables(&self) -> Vec<&Variable> {
        let mut variables = Vec::new();
        self.collect_placeholders(&mut variables);
        variables
    }

    fn collect_placeholders<'a>(&'a self, out: &mut Vec<&'a Variable>) {
        match self {
            IntermediateResult::Object { entries } => {
                for child in entries.values() {
                    child.collect_placeholders(out);
                }
            }
            IntermediateResult::Array { template, .. } => template.collect_placeholders(out),
            IntermediateResult::NamePlaceholder { variable }
            | IntermediateResult::NativePlaceholder { variable } => out.push(variable),
            IntermediateResult::NativeValue { .. } => {}
        }
    }
}

fn serialize_variable<S: Serializer>(variable: &Variable, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(variable.as_str())
}
