#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for querying live emergency-room congestion.
//!
//! ```text
//! er_congestion_cli hospitals [--region 서울특별시] [--labels low,medium]
//! er_congestion_cli recommend --lat 37.5665 --lon 126.9780
//! er_congestion_cli regions
//! er_congestion_cli markers
//! er_congestion_cli legend
//! er_congestion_cli serve
//! ```
//!
//! The service key is read from `EGEN_API_KEY` or the `--config` TOML file.

mod output;

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use er_congestion_query::distinct_regions;
use er_congestion_query::markers::legend;
use er_congestion_query::view::{QueryInput, View};
use er_congestion_source::pipeline::{Pipeline, Snapshot};
use er_congestion_source::settings::{ConfigError, SourceSettings};

#[derive(Parser)]
#[command(
    name = "er_congestion_cli",
    about = "Live emergency-room congestion from the national EGEN feed"
)]
struct Cli {
    /// TOML settings file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of rows to request from the API
    #[arg(long, global = true)]
    rows: Option<NonZeroU32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// Exact region (first token of the address), or `all`
    #[arg(long)]
    region: Option<String>,
    /// Case-insensitive substring of the hospital name
    #[arg(long)]
    name: Option<String>,
    /// Comma-separated labels to keep (default: low,medium,high)
    #[arg(long)]
    labels: Option<String>,
    /// Reference latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,
    /// Reference longitude
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,
}

impl From<QueryArgs> for QueryInput {
    fn from(args: QueryArgs) -> Self {
        Self {
            region: args.region,
            name: args.name,
            labels: args.labels,
            latitude: args.lat,
            longitude: args.lon,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List hospitals, least congested first
    Hospitals {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Top picks by congestion, then distance from --lat/--lon
    Recommend {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// List the regions present in the current data
    Regions,
    /// Print map markers as JSON
    Markers {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show the congestion label legend
    Legend,
    /// Start the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    er_congestion_server::init_logger();
    let cli = Cli::parse();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Hospitals { query } => {
            let settings = load_settings(config, cli.rows)?;
            let snapshot = refresh(&settings).await?;
            let view = View::from_input(&snapshot.rows, query.into());
            print_warning(view.warning.as_deref());
            println!("{}", output::hospital_table(&view.hospitals));
        }
        Commands::Recommend { query } => {
            let settings = load_settings(config, cli.rows)?;
            let snapshot = refresh(&settings).await?;
            let view = View::from_input(&snapshot.rows, query.into());
            print_warning(view.warning.as_deref());
            match view.recommended {
                Some(recommended) => println!("{}", output::hospital_table(&recommended)),
                None => {
                    eprintln!("A valid --lat and --lon are required for recommendations.");
                    std::process::exit(2);
                }
            }
        }
        Commands::Regions => {
            let settings = load_settings(config, cli.rows)?;
            let snapshot = refresh(&settings).await?;
            for region in distinct_regions(&snapshot.rows) {
                println!("{region}");
            }
        }
        Commands::Markers { query } => {
            let settings = load_settings(config, cli.rows)?;
            let snapshot = refresh(&settings).await?;
            let view = View::from_input(&snapshot.rows, query.into());
            print_warning(view.warning.as_deref());
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "center": view.center,
                    "markers": view.markers,
                }))?
            );
        }
        Commands::Legend => print!("{}", output::legend_table(&legend())),
        Commands::Serve => {
            let settings = load_settings(config, cli.rows)?;
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(er_congestion_server::run_server(&settings))
            })
            .await??;
        }
    }

    Ok(())
}

/// Loads settings, letting `--rows` override the configured row limit.
fn load_settings(
    config: Option<&Path>,
    rows: Option<NonZeroU32>,
) -> Result<SourceSettings, ConfigError> {
    let mut settings = SourceSettings::load(config)?;
    if let Some(rows) = rows {
        settings.row_limit = rows.get();
    }
    Ok(settings)
}

/// Runs one refresh, exiting with status 1 if the fetch fails.
async fn refresh(settings: &SourceSettings) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let pipeline = Pipeline::from_settings(settings)?;
    match pipeline.refresh(settings.row_limit()).await {
        Ok(snapshot) => {
            log::info!(
                "Fetched {} rows ({} without coordinates dropped)",
                snapshot.rows.len(),
                snapshot.dropped
            );
            Ok(snapshot)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_warning(warning: Option<&str>) {
    if let Some(warning) = warning {
        eprintln!("Warning: {warning}");
    }
}
