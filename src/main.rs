use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, info, warn};

use trailstat::analysis::analyze_file;
use trailstat::batch::{BatchAnalyzer, BatchConfig, FileAnalysisResult};
use trailstat::cache::TrackCache;
use trailstat::config::AppConfig;
use trailstat::error::{ErrorSeverity, TrailError};
use trailstat::export::{self, ExportFormat, TrackReport};
use trailstat::import::ImportManager;
use trailstat::logging::{init_logging, LogLevel};
use trailstat::models::Activity;
use trailstat::summary::format_duration;

/// trailstat - GPX track analytics CLI
///
/// Parses recorded GPS tracks, filters pauses, smooths speeds and reports
/// distance, time, speed and elevation statistics with an energy estimate.
#[derive(Parser)]
#[command(name = "trailstat")]
#[command(author = "trailstat Contributors")]
#[command(version = "0.1.0")]
#[command(about = "GPX track analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single GPX track
    Analyze {
        /// GPX file to analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Activity for the energy estimate (Running, Cycling, Walking)
        #[arg(short, long)]
        activity: Option<Activity>,

        /// Body weight in kg for the energy estimate
        #[arg(short, long)]
        weight: Option<f64>,

        /// Gaps longer than this many seconds are treated as pauses
        #[arg(long)]
        pause_threshold: Option<f64>,

        /// Smoothing window in samples
        #[arg(long)]
        window: Option<usize>,

        /// Output format (table, json, text)
        #[arg(short = 'F', long, default_value = "table")]
        format: String,

        /// Also write the report to this file (.json or .txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze every GPX file in a directory in parallel
    Batch {
        /// Directory to scan (defaults to the configured data_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,
    },

    /// Export the distance / elevation / speed profile of a track
    Profile {
        /// GPX file to analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Output file; format follows the extension (csv, json)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct BatchRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Distance (km)")]
    distance: String,
    #[tabled(rename = "Avg (km/h)")]
    average_speed: String,
    #[tabled(rename = "Time")]
    time: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path));

    let mut log_config = config.logging.clone();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    init_logging(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Analyze {
            file,
            activity,
            weight,
            pause_threshold,
            window,
            format,
            output,
        } => {
            let mut options = config.analysis.options();
            if let Some(threshold) = pause_threshold {
                options.pause_threshold_seconds = threshold;
            }
            if let Some(window) = window {
                options.smoothing_window = window;
            }

            let mut profile = config.profile.clone();
            if activity.is_some() {
                profile.activity = activity;
            }
            if weight.is_some() {
                profile.weight_kg = weight;
            }

            let importer = ImportManager::new(config.analysis.timestamp_policy);
            let result = analyze_file(&file, &importer, &options).map_err(report_failure)?;
            let report = TrackReport::new(&file, &result, &profile);

            match format.to_lowercase().as_str() {
                "table" => print_report_table(&report),
                "json" => println!("{}", export::json::to_json_string(&report)?),
                "text" => export::text::write_track_report(&report, std::io::stdout())?,
                other => anyhow::bail!("Unknown output format: {}", other),
            }

            if let Some(output) = output {
                write_report(&report, &output)?;
                println!("{} {}", "✓ Report written to".green(), output.display());
            }
        }

        Commands::Batch { dir, quiet } => {
            let dir = dir.unwrap_or_else(|| config.data_dir.clone());
            println!("{} {}", "Analyzing tracks in".cyan().bold(), dir.display());

            let batch = BatchAnalyzer::new(
                BatchConfig {
                    show_progress: !quiet,
                    options: config.analysis.options(),
                },
                ImportManager::new(config.analysis.timestamp_policy),
                Arc::new(TrackCache::new()),
            );
            let summary = batch.analyze_directory(&dir).map_err(report_failure)?;

            let rows: Vec<BatchRow> = summary.results.iter().map(batch_row).collect();
            if !rows.is_empty() {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
            println!("{}", summary.to_string_pretty());

            if summary.is_fully_successful() {
                println!("{}", "✓ Batch completed".cyan());
            } else {
                println!(
                    "{}",
                    format!("⚠ {} file(s) could not be analyzed", summary.failed_files).yellow()
                );
            }
        }

        Commands::Profile { file, output } => {
            let importer = ImportManager::new(config.analysis.timestamp_policy);
            let result = analyze_file(&file, &importer, &config.analysis.options())
                .map_err(report_failure)?;
            let rows = export::profile_series(&result);

            match ExportFormat::from_path(&output)? {
                ExportFormat::Csv => export::csv::export_profile(&rows, &output)?,
                ExportFormat::Json => export::json::export_profile(&rows, &output)?,
                ExportFormat::Text => {
                    anyhow::bail!("Profile export supports csv and json, not text")
                }
            }

            info!(rows = rows.len(), output = %output.display(), "Profile exported");
            println!(
                "{} {} rows to {}",
                "✓ Exported".green(),
                rows.len(),
                output.display()
            );
        }

        Commands::Config { list, set, get } => {
            if list {
                println!("{}", format!("Configuration ({})", config_path.display()).bold());
                for key in AppConfig::keys() {
                    let value = config.get_value(key).unwrap_or_default();
                    println!("  {} = {}", key.cyan(), value);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got: {}", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                let value = config
                    .get_value(&key)
                    .with_context(|| format!("Unknown configuration key: {}", key))?;
                println!("{}", value);
            } else {
                println!("Use --list, --set key=value or --get key");
            }
        }
    }

    Ok(())
}

/// Log a library error at its severity and turn it into the user-facing message
fn report_failure(err: TrailError) -> anyhow::Error {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => error!(error = %err, "Analysis failed"),
        ErrorSeverity::Warning => warn!(error = %err, "Analysis failed"),
        ErrorSeverity::Info => info!(error = %err, "Analysis failed"),
    }
    anyhow::anyhow!(err.user_message())
}

fn print_report_table(report: &TrackReport) {
    let metrics = &report.metrics;
    let title = report.track_name.as_deref().unwrap_or(&report.source);
    println!("{}", title.green().bold());

    let mut rows = vec![
        MetricRow {
            name: "Distance",
            value: format!("{:.2} km", metrics.total_distance_km),
        },
        MetricRow {
            name: "Moving time",
            value: report.total_time.clone(),
        },
        MetricRow {
            name: "Average speed",
            value: format!("{:.2} km/h", metrics.average_speed),
        },
        MetricRow {
            name: "Highest speed",
            value: format!("{:.2} km/h", metrics.highest_speed),
        },
        MetricRow {
            name: "Lowest speed",
            value: format!("{:.2} km/h", metrics.lowest_speed),
        },
        MetricRow {
            name: "Top elevation",
            value: format!("{:.0} m", metrics.top_elevation),
        },
        MetricRow {
            name: "Lowest elevation",
            value: format!("{:.0} m", metrics.lowest_elevation),
        },
        MetricRow {
            name: "Segments kept / paused",
            value: format!("{} / {}", report.kept_segments, report.discarded_segments),
        },
        MetricRow {
            name: "Suggested activity",
            value: report.suggested_activity.to_string(),
        },
    ];
    if let Some(kcal) = report.energy_kcal {
        rows.push(MetricRow {
            name: "Energy",
            value: format!("{:.0} kcal", kcal),
        });
    }
    println!("{}", Table::new(rows).with(Style::rounded()));

    if report.energy_kcal.is_none() {
        let note = report.energy_note.as_deref().unwrap_or("profile incomplete");
        println!(
            "{}",
            format!(
                "Energy estimate unavailable ({}). Pass --activity and --weight or set them with `config --set`.",
                note
            )
            .yellow()
        );
    }
}

fn write_report(report: &TrackReport, output: &Path) -> Result<()> {
    match ExportFormat::from_path(output)? {
        ExportFormat::Json => export::json::export_track_report(report, output)?,
        ExportFormat::Text => export::text::export_track_report(report, output)?,
        ExportFormat::Csv => anyhow::bail!("Reports are written as json or txt, not csv"),
    }
    Ok(())
}

fn batch_row(result: &FileAnalysisResult) -> BatchRow {
    let file = result
        .file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| result.file_path.display().to_string());

    match &result.analysis {
        Some(done) => {
            let metrics = &done.analysis.metrics;
            BatchRow {
                file,
                status: "ok".green().to_string(),
                distance: format!("{:.2}", metrics.total_distance_km),
                average_speed: format!("{:.2}", metrics.average_speed),
                time: format_duration(metrics.total_time_seconds),
            }
        }
        None => BatchRow {
            file,
            status: "failed".red().to_string(),
            distance: "-".to_string(),
            average_speed: "-".to_string(),
            time: result.error.clone().unwrap_or_default(),
        },
    }
}
