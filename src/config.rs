//! Run configuration, read from a TOML file. Every field has a default
//! reproducing the reference session (municipality 351, 27 January 2020).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::grids::{AreaIdentifier, GridKind, MAX_NB_TILES_REQUEST};
use crate::api::HourlyWindow;
use crate::credentials::CredentialLines;
use crate::{DEFAULT_API_VERSION, PRODUCTION_BASE_URL, PRODUCTION_TOKEN_URL};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub token_url: String,
    pub api_version: String,
    pub secrets: SecretsConfig,
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: PRODUCTION_BASE_URL.to_string(),
            token_url: PRODUCTION_TOKEN_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            secrets: SecretsConfig::default(),
            run: RunConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub path: PathBuf,
    #[serde(flatten)]
    pub lines: CredentialLines,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        SecretsConfig {
            path: PathBuf::from("secrets/swisscom.txt"),
            lines: CredentialLines::default(),
        }
    }
}

/// What a single run fetches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Area whose tiles are queried for hourly density
    pub area: AreaIdentifier,
    pub window: HourlyWindow,
    pub max_tiles: usize,
    /// Grids saved to disk before the density queries
    pub dumps: Vec<GridDump>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 27)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();

        RunConfig {
            area: AreaIdentifier::municipality(351),
            window: HourlyWindow::new(start, 24),
            max_tiles: MAX_NB_TILES_REQUEST,
            dumps: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridDump {
    pub kind: GridKind,
    pub id: u32,
    pub path: PathBuf,
}

impl GridDump {
    pub fn area(&self) -> AreaIdentifier {
        AreaIdentifier {
            kind: self.kind,
            id: self.id,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
