//! Analyze command - score a single pitch deck.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use pitchscore_core::{AnalysisReport, Analyzer, PitchConfig, Strategy};

use super::{load_config, read_deck};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input deck (.pdf, .ppt or .pptx)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Never call the remote model, even if configured
    #[arg(long)]
    heuristic_only: bool,

    /// Show which scorer produced the result
    #[arg(long)]
    show_strategy: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-deck output files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Build the analyzer for a run.
pub fn build_analyzer(config: &PitchConfig, heuristic_only: bool) -> Analyzer {
    let analyzer = Analyzer::from_config(config);
    if heuristic_only {
        analyzer.without_remote()
    } else {
        analyzer
    }
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let data = read_deck(&args.input, &config.limits)?;

    info!("Analyzing file: {}", args.input.display());

    let analyzer = build_analyzer(&config, args.heuristic_only);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(if analyzer.remote_enabled() {
        "Scoring with remote model..."
    } else {
        "Scoring..."
    });

    let filename = args.input.file_name().and_then(|n| n.to_str());
    let report = analyzer.analyze_report(&data, filename).await;
    pb.finish_and_clear();
    let report = report?;

    let name = filename.unwrap_or("deck");
    let output = format_report(name, &report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_strategy {
        eprintln!();
        eprintln!("{} Scored by: {}", style("ℹ").blue(), strategy_label(&report));
        eprintln!(
            "{} Extracted text: {} chars",
            style("ℹ").blue(),
            report.text_chars
        );
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            report.processing_time_ms
        );
    }

    debug!("Total run time: {:?}", start.elapsed());

    Ok(())
}

/// Human-readable scorer description, including any fallback cause.
pub fn strategy_label(report: &AnalysisReport) -> String {
    match (report.strategy, &report.fallback_cause) {
        (Strategy::Remote, _) => "remote model".to_string(),
        (Strategy::Heuristic, Some(cause)) => format!("keyword heuristic (remote failed: {})", cause),
        (Strategy::Heuristic, None) => "keyword heuristic".to_string(),
    }
}

/// Render a report in the requested format.
pub fn format_report(name: &str, report: &AnalysisReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.result)?),
        OutputFormat::Csv => format_csv(name, report),
        OutputFormat::Text => Ok(format_text(name, report)),
    }
}

fn format_csv(name: &str, report: &AnalysisReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let result = &report.result;

    let mut header = vec!["filename", "score"];
    header.extend(result.breakdown().iter().map(|(c, _)| c.as_str()));
    header.push("recommendations");
    wtr.write_record(&header)?;

    let mut row = vec![name.to_string(), result.score().to_string()];
    row.extend(result.breakdown().iter().map(|(_, s)| s.to_string()));
    row.push(result.notes());
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(name: &str, report: &AnalysisReport) -> String {
    let result = &report.result;
    let mut output = String::new();

    output.push_str(&format!("Deck: {}\n", name));
    output.push_str(&format!("Score: {}/100\n", result.score()));
    output.push('\n');

    output.push_str("Breakdown:\n");
    for (category, score) in result.breakdown().iter() {
        output.push_str(&format!(
            "  {:<8} {:>3}  (weight {}%)\n",
            category,
            score,
            category.weight_percent()
        ));
    }
    output.push('\n');

    output.push_str("Recommendations:\n");
    for tip in result.recommendations() {
        output.push_str(&format!("  - {}\n", tip));
    }

    output.push_str(&format!(
        "\nAnalyzed at {}\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchscore_core::{Breakdown, HeuristicScorer};

    fn report() -> AnalysisReport {
        let result = HeuristicScorer::new().analyze("");
        AnalysisReport {
            result,
            strategy: Strategy::Heuristic,
            fallback_cause: Some("timeout".to_string()),
            text_chars: 0,
            processing_time_ms: 3,
            analyzed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let csv = format_report("deck.pdf", &report(), OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("filename,score,team,market,product,finance,design,recommendations")
        );
        assert!(lines.next().unwrap().starts_with("deck.pdf,0,0,0,0,0,0,"));
    }

    #[test]
    fn test_json_is_bare_result() {
        let json = format_report("deck.pdf", &report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["score"], 0);
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 5);
        assert!(value.get("strategy").is_none());
        let breakdown: Breakdown = serde_json::from_value(value["breakdown"].clone()).unwrap();
        assert_eq!(breakdown, Breakdown::default());
    }

    #[test]
    fn test_text_lists_categories() {
        let text = format_report("deck.pptx", &report(), OutputFormat::Text).unwrap();
        assert!(text.contains("Score: 0/100"));
        assert!(text.contains("product"));
        assert!(text.contains("(weight 30%)"));
    }

    #[test]
    fn test_strategy_label_mentions_fallback() {
        assert_eq!(strategy_label(&report()), "keyword heuristic (remote failed: timeout)");
    }
}
