//! xql: translate a JSON-LD query document into SPARQL
//!
//! Reads the document from a file or stdin and prints the SPARQL query, its
//! algebra, or the full translation as JSON. Warnings go to stderr.

use clap::Parser;
use comfy_table::{ContentArrangement, Table};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use xql::{parse_query_with, ParseWarning, Translation, TranslatorConfig};

#[derive(Parser)]
#[command(name = "xql", version, about = "Translate JSON-LD query documents into SPARQL")]
struct Cli {
    /// Query document; stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "sparql")]
    format: OutputFormat,

    /// YAML translator configuration
    #[arg(long, env = "XQL_CONFIG")]
    config: Option<PathBuf>,

    /// Allow fetching remote @context documents
    #[arg(long)]
    remote_contexts: bool,

    /// Name of the root variable
    #[arg(long)]
    root: Option<String>,

    /// Log translation steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Sparql,
    Algebra,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => TranslatorConfig::from_path(path)?,
        None => TranslatorConfig::default(),
    };
    if cli.remote_contexts {
        config.remote_contexts = true;
    }
    if let Some(root) = &cli.root {
        config.root_variable = root.clone();
    }
    config.validate()?;

    let source = read_input(cli.input.as_ref())?;
    let document: serde_json::Value = serde_json::from_str(&source)?;
    debug!("Read query document ({} bytes)", source.len());

    let translation = parse_query_with(&config.to_parser(), &document).await?;
    print_translation(&translation, &cli.format)?;

    if !translation.warnings.is_empty() {
        eprintln!("{}", warning_table(&translation.warnings));
    }

    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> std::io::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path),
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn print_translation(
    translation: &Translation,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Sparql => println!("{}", translation),
        OutputFormat::Algebra => println!("{}", translation.to_query().to_sse()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(translation)?),
    }
    Ok(())
}

fn warning_table(warnings: &[ParseWarning]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Path", "Warning"]);

    for warning in warnings {
        let path: Vec<String> = warning.path.iter().map(ToString::to_string).collect();
        table.add_row(vec![format!("/{}", path.join("/")), warning.message.clone()]);
    }

    table
}
