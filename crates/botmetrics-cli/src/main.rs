//! botmetrics - chat bot usage dashboard from the command line

use anyhow::{Context, Result};
use botmetrics_aggregate::MetricCatalog;
use botmetrics_cli::{aggregate_file, fetch_view, render, render_catalog, OutputFormat};
use botmetrics_common::{init_logging, DateRange};
use botmetrics_config::{Config, ConfigLoader};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch metrics from the backend and print the dashboard view
    Fetch {
        /// Bot to report on; defaults to the configured bot
        #[arg(short, long)]
        bot: Option<String>,

        /// First day, YYYY-MM-DD
        #[arg(long, requires = "end")]
        start: Option<String>,

        /// Last day, YYYY-MM-DD
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// daily, weekly, monthly, quarterly or yearly
        #[arg(short, long)]
        frequency: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Aggregate a JSON export of raw metric series
    Aggregate {
        /// File holding a JSON array of metric series
        #[arg(short, long)]
        input: PathBuf,

        /// daily, weekly, monthly, quarterly or yearly
        #[arg(short, long)]
        frequency: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// List the frequencies this configuration offers
    Frequencies,

    /// List known metrics and their descriptions
    Catalog,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ConfigLoader::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let mut logging = config.logging.to_logging_config();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
    debug!(?config, "Configuration loaded");

    match args.command {
        Command::Fetch {
            bot,
            start,
            end,
            frequency,
            output,
        } => {
            let frequency = config.dashboard.resolve_frequency(frequency.as_deref())?;
            let range = match (start, end) {
                (Some(start), Some(end)) => DateRange::parse(&start, &end)?,
                _ => config.dashboard.default_range(Local::now().date_naive())?,
            };
            let bot = bot.unwrap_or_else(|| config.dashboard.bot_name.clone());
            info!("Fetching {} metrics for {} at {} frequency", bot, range, frequency);

            let view = fetch_view(&config, &bot, range, frequency).await?;
            println!("{}", render(&view, output)?);
        }
        Command::Aggregate {
            input,
            frequency,
            output,
        } => {
            let frequency = config.dashboard.resolve_frequency(frequency.as_deref())?;
            let view = aggregate_file(&input, frequency)?;
            println!("{}", render(&view, output)?);
        }
        Command::Frequencies => {
            for frequency in &config.dashboard.offered_frequencies {
                let marker = if *frequency == config.dashboard.default_frequency {
                    " (default)"
                } else {
                    ""
                };
                println!("{}{}", frequency, marker);
            }
        }
        Command::Catalog => {
            print!("{}", render_catalog(&MetricCatalog::default()));
        }
    }

    Ok(())
}
