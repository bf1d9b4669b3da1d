//! Batch command - score multiple decks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use pitchscore_core::{AnalysisReport, Analyzer};

use super::analyze::{build_analyzer, format_report, OutputFormat};
use super::{is_deck, load_config, read_deck};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching input decks
    #[arg(required = true)]
    input: String,

    /// Output directory for per-deck results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Never call the remote model, even if configured
    #[arg(long)]
    heuristic_only: bool,
}

/// Outcome of analyzing a single file.
struct BatchEntry {
    path: PathBuf,
    report: Option<AnalysisReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let limits = config.limits.clone();

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_deck(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching decks found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} decks to analyze",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let analyzer = build_analyzer(&config, args.heuristic_only);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} decks")?
            .progress_chars("=>-"),
    );

    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = analyze_file(&analyzer, &path, &limits).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => entries.push(BatchEntry {
                path,
                report: Some(report),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to analyze {}: {}", path.display(), error_msg);
                    entries.push(BatchEntry {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to analyze {}: {}", path.display(), error_msg);
                    anyhow::bail!("Analysis failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for entry in &entries {
            if let Some(report) = &entry.report {
                let name = file_name(&entry.path);
                let stem = entry
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("deck");
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

                fs::write(&output_path, format_report(name, report, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &entries)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = entries.iter().filter(|e| e.error.is_some()).collect();

    println!();
    println!(
        "{} Analyzed {} decks in {:?}",
        style("✓").green(),
        entries.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(entries.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for entry in &failed {
            println!(
                "  - {}: {}",
                entry.path.display(),
                entry.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn analyze_file(
    analyzer: &Analyzer,
    path: &Path,
    limits: &pitchscore_core::models::LimitsConfig,
) -> anyhow::Result<AnalysisReport> {
    let data = read_deck(path, limits)?;
    Ok(analyzer.analyze_report(&data, Some(file_name(path))).await?)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

fn write_summary(path: &Path, entries: &[BatchEntry]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "score",
        "team",
        "market",
        "product",
        "finance",
        "design",
        "strategy",
        "analyzed_at",
        "processing_time_ms",
        "error",
    ])?;

    for entry in entries {
        let filename = file_name(&entry.path);

        if let Some(report) = &entry.report {
            let b = report.result.breakdown();
            wtr.write_record([
                filename,
                "success",
                &report.result.score().to_string(),
                &b.team.to_string(),
                &b.market.to_string(),
                &b.product.to_string(),
                &b.finance.to_string(),
                &b.design.to_string(),
                report.strategy.as_str(),
                &report.analyzed_at.to_rfc3339(),
                &entry.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &entry.processing_time_ms.to_string(),
                entry.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
