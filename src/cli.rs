//! Command-line front end.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use cruiseride::metrics::{AnalysisResult, Distribution, RideAnalyzer};
use cruiseride::recording::import_csv_file;
use cruiseride::storage::config::{config_to_toml, get_config_path};
use cruiseride::storage::{load_config, save_config, AnalysisConfig};
use serde::Serialize;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Segment rides and compute power metrics
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Print or write the analysis configuration
    Config(#[clap(flatten)] ConfigArg),
}

#[derive(Debug, Clone, clap::Args)]
struct AnalyzeArg {
    /// Ride CSV files
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Configuration file (defaults to the user config location)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Functional Threshold Power override in watts
    #[arg(long)]
    ftp: Option<f64>,
    /// Leave power gaps unfilled
    #[arg(long)]
    no_interpolate: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, clap::Args)]
struct ConfigArg {
    /// Configuration file (defaults to the user config location)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective configuration back to disk
    #[arg(long)]
    write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    analysis: &'a AnalysisResult,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze(&arg)?,
        Mode::Config(arg) => config(&arg)?,
    }
    Ok(())
}

fn analyze(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let mut config = load_config(arg.config.as_deref()).context("Failed to load configuration")?;
    if let Some(ftp) = arg.ftp {
        config.power.ftp = Some(ftp);
    }
    if arg.no_interpolate {
        config.power.power_interpolate = false;
    }
    let analyzer = RideAnalyzer::new(config).context("Invalid configuration")?;

    // One scoped thread per ride; results come back in argument order.
    let outcomes: Vec<anyhow::Result<AnalysisResult>> = std::thread::scope(|scope| {
        let handles: Vec<_> = arg
            .files
            .iter()
            .map(|path| scope.spawn(move || analyze_file(&analyzer, path)))
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("Analysis thread panicked")))
            })
            .collect()
    });

    let mut failures = 0usize;
    let mut reports = Vec::new();
    for (path, outcome) in arg.files.iter().zip(&outcomes) {
        match outcome {
            Ok(analysis) => reports.push(FileReport {
                file: path,
                analysis,
            }),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {:#}", path.display(), e);
            }
        }
    }

    match arg.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)
                .context("Failed to serialize analysis")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for report in &reports {
                print_report(report);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} rides failed", failures, arg.files.len());
    }
    Ok(())
}

fn analyze_file(analyzer: &RideAnalyzer, path: &Path) -> anyhow::Result<AnalysisResult> {
    let series = import_csv_file(path)
        .with_context(|| format!("Failed to import ride: {}", path.display()))?;
    let analysis = analyzer
        .analyze(&series)
        .with_context(|| format!("Failed to analyze ride: {}", path.display()))?;
    Ok(analysis)
}

fn print_report(report: &FileReport<'_>) {
    let analysis = report.analysis;
    let breakdown = &analysis.phase_breakdown;

    println!("== {} ==", report.file.display());
    println!("Duration:    {}", format_duration(analysis.duration_secs));
    println!(
        "Phases:      stopped {} ({} stops), transition {}, cruising {} ({} runs)",
        format_duration(breakdown.stopped_secs),
        breakdown.stop_count,
        format_duration(breakdown.transition_secs),
        format_duration(breakdown.cruising_secs),
        breakdown.cruising_run_count,
    );

    match &analysis.cruising {
        Some(cruising) => {
            println!(
                "Cruising:    {:.1} km/h over {:.0}% of the ride",
                cruising.cruising_speed_kmh,
                cruising.cruising_fraction * 100.0
            );
            if let Some(power) = cruising.average_power {
                println!("             {:.0} W average", power);
            }
        }
        None => println!("Cruising:    none"),
    }

    if let Some(power) = &analysis.metrics.power {
        if power.valid_samples > 0 {
            print!("Power:       NP {:.0} W", power.normalized_power);
            if let Some(avg) = power.average_power {
                print!(", avg {:.0} W", avg);
            }
            if let Some(max) = power.max_power {
                print!(", max {:.0} W", max);
            }
            println!();
            if let Some(if_value) = power.intensity_factor {
                print!("             IF {:.2}", if_value);
                if let Some(tss) = power.training_stress_score {
                    print!(", TSS {:.0}", tss);
                }
                println!();
            }
        } else {
            println!("Power:       no power data");
        }
    }

    if let Some(dist) = &analysis.metrics.cruising_speed_distribution {
        print_distribution("Cruise km/h", dist, 3.6);
    }
    if let Some(dist) = &analysis.metrics.cruising_power_distribution {
        print_distribution("Cruise W", dist, 1.0);
    }

    if let Some(zones) = &analysis.metrics.time_in_zones {
        for zone in zones.iter().filter(|z| z.seconds > 0.0) {
            println!(
                "  Z{} {:<16} {:>8} {:>5.1}%",
                zone.zone,
                zone.name,
                format_duration(zone.seconds),
                zone.fraction * 100.0
            );
        }
    }
    println!();
}

fn print_distribution(label: &str, dist: &Distribution, scale: f64) {
    let percentiles: Vec<String> = dist
        .percentiles
        .iter()
        .map(|p| format!("p{:.0}={:.1}", p.percentile, p.value * scale))
        .collect();
    println!(
        "{:<12} mean {:.1}, sd {:.1}, {}",
        format!("{}:", label),
        dist.summary.mean * scale,
        dist.summary.std_dev * scale,
        percentiles.join(" ")
    );
}

fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn config(arg: &ConfigArg) -> anyhow::Result<()> {
    let config: AnalysisConfig =
        load_config(arg.config.as_deref()).context("Failed to load configuration")?;

    if arg.write {
        let path = save_config(&config, arg.config.as_deref())
            .context("Failed to write configuration")?;
        println!("Wrote {}", path.display());
    } else {
        let path = arg.config.clone().unwrap_or_else(get_config_path);
        println!("# {}", path.display());
        print!("{}", config_to_toml(&config)?);
    }
    Ok(())
}
