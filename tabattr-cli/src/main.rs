use std::io::{self, BufReader, Read, Write};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Pandoc filter: attach `{#id .class key=val}` caption annotations to
/// tables.
///
/// Reads a pandoc JSON AST from stdin and writes the transformed AST to
/// stdout, e.g. `pandoc --filter tabattr input.md -o output.html`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output format, passed by pandoc as the filter's first argument
    #[arg(default_value = "")]
    format: String,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Stdout carries the transformed AST; diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    run(&args)
}

#[tracing::instrument]
fn run(args: &Args) -> Result<()> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    let doc: serde_json::Value = serde_json::from_str(&input)?;
    let doc = tabattr_filter::filter(doc, &args.format, tabattr_filter::add_table_attr)?;

    let mut stdout = io::stdout();
    serde_json::to_writer(&stdout, &doc)?;
    stdout.flush()?;
    Ok(())
}
