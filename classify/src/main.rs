use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use classifier_core::batch::{classify_dir, classify_paths, FileOutcome};
use classifier_core::{Classifier, Label, Scores};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "classify")]
#[command(about = "Classify documents with a pre-trained Naive Bayes model", long_about = None)]
struct Cli {
    /// Model directory or classifier.json manifest
    #[arg(long, default_value = "./model")]
    model: PathBuf,
    /// Print per-label scores
    #[arg(long, default_value_t = false)]
    scores: bool,
    /// Emit one JSON object per line
    #[arg(long, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recursively classify every file in a directory
    Dir {
        path: PathBuf,
    },
    /// Classify the given files
    File {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Classify text given on the command line
    Text {
        text: String,
    },
}

#[derive(Serialize)]
struct OutLine<'a> {
    source: &'a str,
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<Vec<(String, f64)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let classifier: Classifier<Label> = Classifier::open(&cli.model)?;

    let failed = match &cli.command {
        Commands::Dir { path } => report_files(&cli, &classifier, classify_dir(&classifier, path)?),
        Commands::File { paths } => report_files(&cli, &classifier, classify_paths(&classifier, paths)),
        Commands::Text { text } => {
            let (label, scores) = classifier.classify_with_scores(text)?;
            print_line(&cli, &classifier, "<text>", Ok((label, scores)));
            0
        }
    };

    if failed > 0 {
        bail!("{failed} document(s) could not be classified");
    }
    Ok(())
}

fn report_files(cli: &Cli, classifier: &Classifier<Label>, outcomes: Vec<FileOutcome<Label>>) -> usize {
    let mut failed = 0;
    for FileOutcome { path, outcome } in outcomes {
        if outcome.is_err() {
            failed += 1;
        }
        print_line(cli, classifier, &path.display().to_string(), outcome.map_err(|e| e.to_string()));
    }
    tracing::info!(failed, "classification finished");
    failed
}

fn print_line(cli: &Cli, classifier: &Classifier<Label>, source: &str, result: std::result::Result<(Label, Scores), String>) {
    let scores = match &result {
        Ok((_, s)) if cli.scores => Some(classifier.named_scores(s)),
        _ => None,
    };
    if cli.json {
        let line = OutLine {
            source,
            label: result.as_ref().ok().map(|(l, _)| l.to_string()),
            scores,
            error: result.as_ref().err().cloned(),
        };
        match serde_json::to_string(&line) {
            Ok(s) => println!("{s}"),
            Err(e) => tracing::error!(error = %e, "failed to encode output line"),
        }
        return;
    }
    match result {
        Ok((label, _)) => {
            let mut out = format!("{label}\t{source}");
            for (name, score) in scores.unwrap_or_default() {
                out.push_str(&format!("\t{name}={score:.4}"));
            }
            println!("{out}");
        }
        Err(e) => println!("error\t{source}\t{e}"),
    }
}
