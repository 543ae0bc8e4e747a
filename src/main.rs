use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

mod aggregate;
mod clean;
mod config;
mod dataset;
mod error;
mod filter;
mod logging;
mod models;
mod report;
mod view;

use config::Config;
use dataset::Dataset;
use filter::{FilterSelection, MonthSelector, TeamSelector};
use view::Theme;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales analytics dashboard over call-center records", long_about = None)]
struct Cli {
    /// Configuration file (optional)
    #[arg(long, global = true, default_value = config::CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the raw export into the cleaned dataset
    Clean {
        #[arg(long)]
        raw: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the cleaned dataset back out in raw export form
    Rawify {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// List the month and team selector options
    Options {
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Emit the panel payloads as JSON
    Dashboard {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Cleaned dataset, defaults to the configured path
    #[arg(long)]
    data: Option<PathBuf>,
    /// 0 for the whole year, otherwise 1-12
    #[arg(long, default_value = "0")]
    month: MonthSelector,
    /// Team name, or 0 / All for every team
    #[arg(long, default_value = "0")]
    team: TeamSelector,
    /// Use the dark theme
    #[arg(long, conflicts_with = "light")]
    dark: bool,
    /// Use the light theme, even when the config asks for dark
    #[arg(long)]
    light: bool,
}

impl ViewArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new(self.month, self.team.clone())
    }

    fn theme(&self, config: &Config) -> Theme {
        let dark = if self.light {
            false
        } else {
            self.dark || config.dashboard.dark
        };
        Theme::from_toggle(!dark)
    }
}

fn load_dataset(data: Option<&Path>, config: &Config) -> anyhow::Result<Dataset> {
    Dataset::load(data.unwrap_or(config.data.cleaned.as_path()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    logging::init(&config.logging)?;

    run(cli.command, &config).inspect_err(|err| error!("{err:#}"))
}

fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Clean { raw, out } => {
            let raw = raw.unwrap_or_else(|| config.data.raw.clone());
            let out = out.unwrap_or_else(|| config.data.cleaned.clone());
            let rows = clean::clean_file(&raw, &out)?;
            println!("Cleaned {rows} rows into {}.", out.display());
        }
        Commands::Rawify { data, out } => {
            let dataset = load_dataset(data.as_deref(), config)?;
            let rows: Vec<models::RawRecord> =
                dataset.records().iter().map(clean::to_raw).collect();
            clean::write_csv(&out, &rows)?;
            println!("Wrote {} raw rows to {}.", rows.len(), out.display());
        }
        Commands::Options { data } => {
            let dataset = load_dataset(data.as_deref(), config)?;
            println!("Months:");
            for option in dataset.month_options() {
                println!("- {} ({})", option.label, option.value);
            }
            println!("Teams:");
            for option in dataset.team_options() {
                println!("- {} ({})", option.label, option.value);
            }
        }
        Commands::Dashboard { view: args, out } => {
            let dataset = load_dataset(args.data.as_deref(), config)?;
            let dashboard = view::compose(&dataset, &args.selection(), args.theme(config));
            let json = serde_json::to_string_pretty(&dashboard)?;

            match out {
                Some(out) => {
                    std::fs::write(&out, json)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(path = %out.display(), "dashboard payload written");
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { view: args, out } => {
            let dataset = load_dataset(args.data.as_deref(), config)?;
            let dashboard = view::compose(&dataset, &args.selection(), args.theme(config));
            let report = report::build_report(&dashboard, chrono::Utc::now());
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
