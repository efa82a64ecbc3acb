//! Command-line interface for requote.
//!
//! Provides commands for locating quoted text in a document file,
//! replacing an exact occurrence, re-checking on every edit, and
//! inspecting the resolved configuration.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config;
use crate::document::{BlockDocument, DocRange};
use crate::engine::{
    anchor_text, offset_to_line_col, slice_fingerprint, FlatIndex, RelocationResult, Relocator,
};
use crate::watch::DocumentWatcher;

/// requote - relocate quoted spans in drifting documents
#[derive(Parser, Debug)]
#[command(name = "requote")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate quoted text in a document
    Locate {
        /// Document file to search
        document: PathBuf,

        /// The quoted text to locate (reads from stdin if not provided)
        text: Option<String>,

        /// Read the quoted text from stdin
        #[arg(long)]
        stdin: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace an exact occurrence of quoted text
    Replace {
        /// Document file to modify
        document: PathBuf,

        /// The text to find (exact, case-insensitive)
        original: String,

        /// The replacement text
        replacement: String,

        /// Write the modified document back to the file
        #[arg(short, long)]
        write: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-run a locate every time the document file changes
    Watch {
        /// Document file to watch
        document: PathBuf,

        /// The quoted text to locate
        text: String,

        /// Emit results as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Locate {
                document,
                text,
                stdin,
                json,
            } => {
                let text = resolve_query_text(text, stdin)?;
                locate(&document, &text, json).await
            }
            Commands::Replace {
                document,
                original,
                replacement,
                write,
                json,
            } => replace(&document, &original, &replacement, write, json).await,
            Commands::Watch {
                document,
                text,
                json,
            } => watch(&document, &text, json).await,
            Commands::Config => show_config(),
        }
    }
}

/// Take the query from the argument or from stdin.
fn resolve_query_text(text: Option<String>, stdin: bool) -> Result<String> {
    if let Some(text) = text {
        if stdin {
            anyhow::bail!("Provide the text as an argument or via --stdin, not both");
        }
        return Ok(text);
    }
    if !stdin {
        anyhow::bail!("No text given; pass it as an argument or use --stdin");
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    Ok(buffer)
}

async fn load_document(path: &Path) -> Result<BlockDocument> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    Ok(BlockDocument::from_text(&source))
}

/// JSON report for locate and watch output
#[derive(Debug, Serialize)]
struct LocateReport {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<DocRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    col: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Run one relocation and build the report for it.
fn run_locate(document: &mut BlockDocument, text: &str) -> Result<LocateReport> {
    let relocator = Relocator::with_options(config::relocate_options()?);
    let window = config::anchor_window()?;

    let report = match relocator.relocate(document, text) {
        RelocationResult::Found { range } => {
            // A locate leaves the document content unchanged, so a fresh
            // index matches the one the engine searched.
            let index = FlatIndex::build(document);
            let flat = index
                .to_flat_offset(range.from)
                .zip(index.to_flat_offset(range.to));

            let (line, col, anchor, fingerprint) = match flat {
                Some((from, to)) => {
                    let pos = offset_to_line_col(&index.text, from);
                    (
                        Some(pos.line),
                        Some(pos.col),
                        Some(anchor_text(&index.text, from, to, window)),
                        Some(slice_fingerprint(&index.text, from, to)),
                    )
                }
                None => (None, None, None, None),
            };

            LocateReport {
                found: true,
                range: Some(range),
                line,
                col,
                matched_text: Some(document.slice(range)),
                anchor,
                fingerprint,
                warning: None,
            }
        }
        RelocationResult::NotFound { warning } => LocateReport {
            found: false,
            range: None,
            line: None,
            col: None,
            matched_text: None,
            anchor: None,
            fingerprint: None,
            warning: Some(warning),
        },
    };

    Ok(report)
}

fn print_report(report: &LocateReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    if report.found {
        if let Some(range) = report.range {
            println!("Found at {}..{}", range.from, range.to);
        }
        if let (Some(line), Some(col)) = (report.line, report.col) {
            println!("Position: line {}, col {}", line, col);
        }
        if let Some(ref matched) = report.matched_text {
            println!("Matched:  {:?}", matched);
        }
        if let Some(ref anchor) = report.anchor {
            println!("Context:  {}", anchor);
        }
        if let Some(ref fingerprint) = report.fingerprint {
            println!("Slice:    {}", fingerprint);
        }
    } else if let Some(ref warning) = report.warning {
        println!("Not found: {}", warning);
    }

    Ok(())
}

async fn locate(path: &Path, text: &str, json: bool) -> Result<()> {
    let mut document = load_document(path).await?;
    let report = run_locate(&mut document, text)?;
    print_report(&report, json)
}

async fn replace(
    path: &Path,
    original: &str,
    replacement: &str,
    write: bool,
    json: bool,
) -> Result<()> {
    let mut document = load_document(path).await?;
    let relocator = Relocator::with_options(config::relocate_options()?);

    let result = relocator.replace_exact(&mut document, original, replacement);

    if json {
        println!("{}", serde_json::to_string(&result)?);
    } else {
        match result.range() {
            Some(range) => println!("Replaced at {}..{}", range.from, range.to),
            None => println!("No exact occurrence found; document unchanged"),
        }
    }

    if result.replaced() && write {
        tokio::fs::write(path, document.to_text())
            .await
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
        if !json {
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

async fn watch(path: &Path, text: &str, json: bool) -> Result<()> {
    // Initial check, then one per settled edit.
    locate(path, text, json).await?;

    let watcher = DocumentWatcher::new(path);
    let (mut events, handle) = watcher.watch().await?;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(changed) => {
                        if !json {
                            println!("--- {} changed, re-checking", changed.path.display());
                        }
                        locate(path, text, json).await?;
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    handle.stop().await
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!(
        "Tolerance: floor {}, ratio {}",
        config.options.limits.tolerance_floor, config.options.limits.tolerance_ratio
    );
    println!(
        "Window variation: {}",
        config.options.limits.length_variation_ratio
    );
    println!("Highlight: {} ms", config.options.highlight_duration_ms);
    println!("Anchor window: {} chars", config.anchor_window);

    Ok(())
}
