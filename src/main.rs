use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Parser;
use log::info;
use swisscom_heatmaps::api::grids::GridKind;
use swisscom_heatmaps::config::Config;
use swisscom_heatmaps::credentials::Credentials;
use swisscom_heatmaps::{pipeline, sink, HeatmapsApi};

/// Query hourly dwell density of a municipality or postal code area
#[derive(Parser, Debug)]
#[command(name = "query-heatmaps")]
struct Cli {
    /// TOML configuration file; built-in defaults apply otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Secrets file (client id and secret on fixed lines)
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// `municipality` or `postal-code-area`
    #[arg(long)]
    area_kind: Option<GridKind>,

    /// SFOS number or postal code
    #[arg(long)]
    area_id: Option<u32>,

    /// First hour of the window, e.g. 2020-01-27T00:00:00
    #[arg(long)]
    start: Option<NaiveDateTime>,

    #[arg(long)]
    hours: Option<u32>,

    #[arg(long)]
    max_tiles: Option<usize>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(secrets) = self.secrets {
            config.secrets.path = secrets;
        }
        if let Some(kind) = self.area_kind {
            config.run.area.kind = kind;
        }
        if let Some(id) = self.area_id {
            config.run.area.id = id;
        }
        if let Some(start) = self.start {
            config.run.window.start = start;
        }
        if let Some(hours) = self.hours {
            config.run.window.hours = hours;
        }
        if let Some(max_tiles) = self.max_tiles {
            config.run.max_tiles = max_tiles;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let config = Cli::parse().into_config()?;

    let credentials = Credentials::from_file(&config.secrets.path, config.secrets.lines)?;
    let mut api = HeatmapsApi::new(credentials)
        .with_base_url(config.base_url.clone())
        .with_token_url(config.token_url.clone())
        .with_api_version(config.api_version.clone());
    api.authenticate()?;
    info!("authenticated against {}", config.token_url);

    let output = pipeline::run(&api, &config.run)?;
    sink::report(io::stdout().lock(), &output.area, &output.scores)?;

    Ok(())
}
