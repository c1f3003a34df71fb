// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildband — turn a batch of photos or receipts into a paginated PDF.
//
// Entry point. Initialises logging, parses the command line, and hands the
// work to the conversion service.

use std::path::PathBuf;
use std::process::ExitCode;

use bildband_core::error::Result;
use bildband_core::human_errors::humanize_error;
use bildband_core::{AssetRef, ConvertConfig, LayoutMode, PaperSize, SortBy};
use bildband_document::{ConversionRequest, ConversionService, collect_paths};
use bildband_layout::{CatalogEntry, MetadataExtractor};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bildband", version, about = "Turn a batch of images into a paginated PDF")]
struct Cli {
    /// JSON settings file; flags override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert images (files or directories) into one PDF.
    Convert {
        /// Image files or directories of images.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file; defaults to a timestamped name in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout: "standard" (one per page) or "receipts" (2x2 grid).
        #[arg(long)]
        mode: Option<LayoutMode>,

        /// Ordering: "name" or "metadata".
        #[arg(long)]
        sort: Option<SortBy>,

        /// Paper: A4, A3, A5, Letter, Legal, Tabloid, or WIDTHxHEIGHT in mm.
        #[arg(long)]
        paper: Option<PaperSize>,
    },
    /// Print the metadata Bildband derives for each image, as JSON.
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "bildband failed");
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };

    match cli.command {
        Command::Convert {
            inputs,
            output,
            mode,
            sort,
            paper,
        } => {
            if let Some(paper) = paper {
                config.paper_size = paper;
            }
            convert(config, &inputs, output, mode, sort)
        }
        Command::Inspect { files } => inspect(&files),
    }
}

fn convert(
    config: ConvertConfig,
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    mode: Option<LayoutMode>,
    sort_by: Option<SortBy>,
) -> Result<()> {
    let uploads = collect_paths(inputs)?;
    let service = ConversionService::new(config);
    let document = service.convert(ConversionRequest {
        uploads,
        mode,
        sort_by,
    })?;

    let path = output.unwrap_or_else(|| PathBuf::from(&document.file_name));
    std::fs::write(&path, &document.bytes)?;

    for error in &document.errors {
        eprintln!("skipped {error}");
    }
    println!(
        "{}: {} image(s) on {} page(s)",
        path.display(),
        document.processed_count,
        document.page_count
    );
    Ok(())
}

fn inspect(files: &[PathBuf]) -> Result<()> {
    let extractor = MetadataExtractor::new();
    let entries: Vec<CatalogEntry> = files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let asset = AssetRef::new(name, path.clone());
            let metadata = extractor.extract(&asset);
            CatalogEntry { asset, metadata }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
