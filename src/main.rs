//! # ARPS Tides Command Line
//!
//! `arps-tides info <IMAGE>` prints the estimated tide height at the time a
//! PlanetScope ARPS QA raster was captured. Input files are checked here,
//! before any of the library pipeline runs.

// Test modules
#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use arps_tides::config::{Config, CONFIG_FILE};
use arps_tides::pipeline;
use arps_tides::renderer::{render_json, render_text};
use arps_tides::tide_data::HakaiTideService;
use arps_tides::TideError;

/// Tide height lookup for PlanetScope ARPS QA rasters
#[derive(Parser, Debug)]
#[command(name = "arps-tides", version)]
struct Cli {
    /// Log level filter (e.g. "warn", "arps_tides=debug")
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Override the tide service base URL from the configuration file
    #[arg(long, env = "ARPS_TIDES_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get tide height info for a PlanetScope ARPS QA raster image
    Info {
        /// Path to the QA raster image (*_qa.tif or *_qa.tiff)
        image_path: PathBuf,

        /// Print the reading as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Check that `path` names an existing ARPS QA GeoTIFF.
///
/// The file must exist, have a `.tif` or `.tiff` extension, and its stem
/// must end in `_qa`.
pub(crate) fn validate_image_path(path: &Path) -> Result<(), TideError> {
    if !path.is_file() {
        return Err(TideError::InvalidInputFile(format!(
            "file does not exist: {}",
            path.display()
        )));
    }

    let extension_ok = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tif") | Some("tiff")
    );
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with("_qa"));

    if !extension_ok || !stem_ok {
        return Err(TideError::InvalidInputFile(format!(
            "not a PlanetScope ARPS QA image: {}",
            path.display()
        )));
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_from_path(&cli.config);
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
    }

    match cli.command {
        Command::Info { image_path, json } => {
            validate_image_path(&image_path)?;

            let service =
                HakaiTideService::new(&config.service.base_url, config.service.timeout())?;
            let reading = pipeline::tide_height(&image_path, &service)
                .await
                .with_context(|| format!("estimating tide height for {}", image_path.display()))?;

            if json {
                println!("{}", render_json(&reading)?);
            } else {
                println!("{}", render_text(&reading));
            }
        }
    }
    Ok(())
}

/// Main application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let result = tokio::runtime::Runtime::new()
        .context("creating tokio runtime")
        .and_then(|rt| rt.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
