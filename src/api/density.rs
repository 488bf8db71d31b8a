use std::collections::BTreeMap;

use anyhow::Context;
use chrono::NaiveDateTime;
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::{ApiClient, HeatmapsError};

use super::{FormatToApiFmt, API_DATETIME_FORMAT};

pub struct DwellDensity<'a> {
    client: &'a dyn ApiClient,
}

#[derive(Deserialize, Debug)]
pub struct DensityResponse {
    pub tiles: Vec<TileScore>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TileScore {
    #[serde(rename = "tileId")]
    pub tile_id: Option<u64>,
    pub score: Number,
}

impl<'a> DwellDensity<'a> {
    const HOURLY_URL: &'static str = "/heatmaps/dwell-density/hourly";

    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self { client }
    }

    pub fn hourly_path(hour: &NaiveDateTime) -> String {
        format!("{}/{}", DwellDensity::HOURLY_URL, hour.to_api_format())
    }

    /// Per-tile dwell density scores of one hour. Each tile id is sent as
    /// its own `tiles=` parameter.
    pub fn hourly(
        &self,
        hour: &NaiveDateTime,
        tile_ids: &[u64],
    ) -> Result<Vec<TileScore>, anyhow::Error> {
        let path = DwellDensity::hourly_path(hour);
        let qs: Vec<(String, String)> = tile_ids
            .iter()
            .map(|id| ("tiles".to_string(), id.to_string()))
            .collect();

        let reply = self.client.http_get(&path, &qs)?;

        let res: DensityResponse = serde_json::from_str(&reply)
            .map_err(HeatmapsError::Json)
            .with_context(|| format!("parsing density reply of {}", path))?;
        debug!("{}: {} tile scores", path, res.tiles.len());

        Ok(res.tiles)
    }
}

/// Total dwell density per hour, keyed by the API timestamp format.
/// Keys are fixed width so key order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DensityScoreMap {
    scores: BTreeMap<String, Number>,
}

fn sum_integers(tiles: &[TileScore]) -> Option<i64> {
    tiles
        .iter()
        .try_fold(0i64, |acc, t| t.score.as_i64().and_then(|v| acc.checked_add(v)))
}

impl DensityScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sums the tile scores of `hour` and stores the total. The total stays
    /// an integer while every tile score is one.
    pub fn record(
        &mut self,
        hour: &NaiveDateTime,
        tiles: &[TileScore],
    ) -> Result<Number, HeatmapsError> {
        let key = hour.to_api_format();
        if self.scores.contains_key(&key) {
            return Err(HeatmapsError::DuplicateHour(key));
        }

        let total = match sum_integers(tiles) {
            Some(total) => Number::from(total),
            None => {
                let total: f64 = tiles.iter().filter_map(|t| t.score.as_f64()).sum();
                Number::from_f64(total)
                    .ok_or_else(|| HeatmapsError::NonFiniteScore(key.clone()))?
            }
        };
        self.scores.insert(key, total.clone());
        Ok(total)
    }

    pub fn get(&self, hour: &NaiveDateTime) -> Option<f64> {
        self.scores
            .get(&hour.to_api_format())
            .and_then(|n| n.as_f64())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Number)> {
        self.scores.iter()
    }

    pub fn total(&self) -> f64 {
        self.scores.values().filter_map(|n| n.as_f64()).sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.scores.is_empty() {
            None
        } else {
            Some(self.total() / self.scores.len() as f64)
        }
    }

    pub fn as_polars_df(&self) -> Result<polars::prelude::DataFrame, anyhow::Error> {
        let mut hours: Vec<NaiveDateTime> = vec![];
        let mut scores: Vec<f64> = vec![];

        for (hour, score) in &self.scores {
            hours.push(NaiveDateTime::parse_from_str(hour, API_DATETIME_FORMAT)?);
            scores.push(score.as_f64().unwrap_or(f64::NAN));
        }

        let df = DataFrame::new(vec![
            Series::new("hour".into(), hours),
            Series::new("score".into(), scores),
        ])?;

        Ok(df)
    }
}
