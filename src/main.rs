// Command line entry point.
//
// `load` reads and normalizes the exports and prints diagnostics only.
// `run` does the same, then writes the tidy table, the reports and the
// summary into the output directory and previews them on the console.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use weekly_etl::config::Config;
use weekly_etl::loader::{self, LoadReport};
use weekly_etl::output::{preview_table_rows, render_summary};
use weekly_etl::pipeline::{self, REPORTS};
use weekly_etl::util::format_int;

#[derive(Parser)]
#[command(name = "weekly_etl")]
#[command(about = "Normalize weekly summary exports into tidy weekly metrics")]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and clean the exports, printing diagnostics
    Load {
        #[arg(long)]
        raw_dir: Option<PathBuf>,
    },
    /// Load, clean, and write the tidy table, reports and summary
    Run {
        #[arg(long)]
        raw_dir: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing dataset... ({} files, {} records melted, {} kept in scope)",
        format_int(report.files_ingested),
        format_int(report.melt.records),
        format_int(report.scoped_records)
    );
    println!(
        "Note: {} rows without a metric label, {} placeholder columns, {} cells under non-week headers skipped.",
        format_int(report.melt.dropped_rows),
        format_int(report.melt.placeholder_columns),
        format_int(report.melt.unparsable_headers)
    );
    if report.melt.undefined_values > 0 {
        println!(
            "Info: {} cells had no parsable amount and were kept without a value.",
            format_int(report.melt.undefined_values)
        );
    }
    println!();
}

fn handle_load(cfg: &Config) -> Result<()> {
    let (records, report) = loader::load_and_clean(cfg)
        .with_context(|| format!("loading exports from {}", cfg.raw_dir.display()))?;
    print_load_report(&report);
    preview_table_rows(&records, 10);
    Ok(())
}

fn handle_run(cfg: &Config) -> Result<()> {
    let outcome = pipeline::run(cfg).context("pipeline run failed")?;
    print_load_report(&outcome.load);

    let set = &outcome.reports;
    let titles = [
        "Total Revenue per Year",
        "Total Net Income per Year",
        "Most Profitable Week",
        "Average Weekly Revenue",
        "Weekly Revenue",
    ];
    for (idx, ((name, _), title)) in REPORTS.iter().zip(titles).enumerate() {
        println!("Report {}: {}\n", idx + 1, title);
        match idx {
            0 => preview_table_rows(&set.total_revenue, 5),
            1 => preview_table_rows(&set.total_net_income, 5),
            2 => preview_table_rows(&set.most_profitable_week, 1),
            3 => preview_table_rows(&set.avg_weekly_revenue, 5),
            _ => preview_table_rows(&set.weekly_revenue, 5),
        }
        println!("(Full table exported to {}.csv)\n", name);
    }

    print!("{}", render_summary(&outcome.summary));
    println!("\nDONE");
    println!("- Outputs saved in: {}/", outcome.out_dir.display());
    Ok(())
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Load { raw_dir } => {
            if let Some(dir) = raw_dir {
                cfg.raw_dir = dir;
            }
            handle_load(&cfg)
        }
        Commands::Run { raw_dir, out_dir } => {
            if let Some(dir) = raw_dir {
                cfg.raw_dir = dir;
            }
            if let Some(dir) = out_dir {
                cfg.out_dir = dir;
            }
            handle_run(&cfg)
        }
    }
}
