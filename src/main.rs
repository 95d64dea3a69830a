use std::path::PathBuf;

use clap::{Parser, Subcommand};
use firm_panel_qc::config::QcConfig;
use firm_panel_qc::pipeline::{self, PanelJob, PanelSources, TableSource};
use firm_panel_qc::{QcError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("firm_panel_qc={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| QcError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check(args) => execute_check(args),
        Command::Export(args) => execute_export(args),
    }
}

fn execute_check(args: RunArgs) -> Result<()> {
    let job = args.into_job()?;
    let outcome = pipeline::check(&job)?;

    println!(
        "checked {} firm-year records ({} rejected rows)",
        outcome.records,
        outcome.rejected.len()
    );
    if outcome.report.is_clean() {
        println!("no anomalies found");
    } else {
        for (error_type, count) in outcome.report.counts_by_type() {
            println!("  {error_type}: {count}");
        }
        println!(
            "{} anomalies written to {}",
            outcome.report.len(),
            job.output.display()
        );
    }
    Ok(())
}

fn execute_export(args: RunArgs) -> Result<()> {
    let job = args.into_job()?;
    let written = pipeline::export_panel(&job)?;
    println!("{written} records written to {}", job.output.display());
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalise and quality-check firm-year financial panel data."
)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the merged panel and write an anomaly report.
    Check(RunArgs),
    /// Write the normalised, merged panel.
    Export(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Primary firm-year table (.xlsx or .csv).
    #[arg(long)]
    panel: PathBuf,

    /// Worksheet of the primary table; defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// Auxiliary table with year-end share prices.
    #[arg(long)]
    market: Option<PathBuf>,

    /// Auxiliary table with innovation evidence notes.
    #[arg(long)]
    innovation: Option<PathBuf>,

    /// TOML file overriding thresholds and field lists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (.csv, .xlsx or .json).
    #[arg(long)]
    output: PathBuf,
}

impl RunArgs {
    fn into_job(self) -> Result<PanelJob> {
        if !self.panel.exists() {
            return Err(QcError::MissingInput(self.panel));
        }
        let config = match &self.config {
            Some(path) => QcConfig::from_toml_file(path)?,
            None => QcConfig::default(),
        };
        let auxiliary = [self.market, self.innovation]
            .into_iter()
            .flatten()
            .map(TableSource::new)
            .collect();

        Ok(PanelJob {
            sources: PanelSources {
                primary: TableSource::new(self.panel).with_sheet(self.sheet),
                auxiliary,
            },
            config,
            output: self.output,
        })
    }
}
