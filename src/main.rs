//! Thin CLI driver for GameFinder
//!
//! Two subcommands: `ingest <folder>` parses every `.pgn` file in the
//! folder, persists the records, and publishes a fresh index generation;
//! `query <folder> <text>` ingests and then evaluates the query, printing
//! the matching records as JSON. The reference store is in-memory, which
//! is why `query` takes the folder too; a durable store behind the same
//! traits would make the subcommands independent.

use std::path::Path;
use std::process::ExitCode;

use gamefinder::GameFinder;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        Some("ingest") if args.len() == 3 => ingest(&args[2]),
        Some("query") if args.len() >= 4 => query(&args[2], &args[3..].join(" ")),
        _ => {
            eprintln!("Usage: {} ingest <folder>", args[0]);
            eprintln!("       {} query <folder> \"<terms>\"", args[0]);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn ingest(folder: &str) -> anyhow::Result<()> {
    let finder = GameFinder::in_memory();
    let report = finder.ingest_dir(Path::new(folder))?;

    println!(
        "Ingested {} records from {} files ({} failed); index generation {} holds {} terms.",
        report.records_ingested,
        report.files_ingested,
        report.failed_files.len(),
        report.build.generation,
        report.build.terms_written,
    );
    for (path, err) in &report.failed_files {
        eprintln!("  skipped {}: {}", path.display(), err);
    }
    Ok(())
}

fn query(folder: &str, text: &str) -> anyhow::Result<()> {
    let finder = GameFinder::in_memory();
    finder.ingest_dir(Path::new(folder))?;

    let results = finder.query(text)?;
    println!("The search results are as follows:\n");
    for record in &results {
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    println!("\n{} record(s) matched.", results.len());
    Ok(())
}
