use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use axum::body::Bytes;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod content;
mod domain;
mod model;
mod server;
mod styling;
mod ui;

use domain::{
    DEFAULT_ADDR, DEFAULT_DATA_SOURCE, DEFAULT_DROP_COLUMN, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_KEY_COLUMN, DEFAULT_MAP_PATH, DashboardConfig, DashboardError,
};
use ui::Dashboard;

/// Serve the Scottish health board cancer prevalence dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// URL or local path of the CSV dataset
    #[arg(long, default_value = DEFAULT_DATA_SOURCE)]
    data: String,

    /// Pre-generated HTML map embedded into the page
    #[arg(long, default_value = DEFAULT_MAP_PATH)]
    map: String,

    /// Column holding the unique health board identifier
    #[arg(long, default_value = DEFAULT_KEY_COLUMN)]
    key_column: String,

    /// Column removed before display
    #[arg(long, default_value = DEFAULT_DROP_COLUMN)]
    drop_column: String,

    /// Address the web server binds to
    #[arg(long, default_value = DEFAULT_ADDR)]
    addr: String,

    /// Timeout of the dataset download in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout: u64,

    /// Write the rendered page to this file instead of serving it
    #[arg(long)]
    render_only: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> Result<DashboardConfig, DashboardError> {
        let map_path = shellexpand::full(&self.map).map_err(|e| {
            warn!("Could not expand map path {}: {e}", self.map);
            DashboardError::FileNotFound(PathBuf::from(&self.map))
        })?;

        Ok(DashboardConfig::default()
            .data_source(self.data.as_str())
            .map_path(PathBuf::from(map_path.as_ref()))
            .key_column(self.key_column.as_str())
            .drop_column(self.drop_column.as_str())
            .addr(self.addr.as_str())
            .fetch_timeout(Duration::from_secs(self.fetch_timeout)))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args).await {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();
}

async fn run(args: &Args) -> Result<(), DashboardError> {
    info!("Starting hbdash!");
    let config = args.to_config()?;

    // All loading happens before anything is bound
    let dashboard = Dashboard::init(&config).await?;
    let page = Bytes::from(dashboard.render());

    match &args.render_only {
        Some(path) => {
            fs::write(path, &page)?;
            info!("Wrote page to {}", path.display());
            Ok(())
        }
        None => server::serve(page, &config.addr).await,
    }
}
