use std::fmt;

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::ApiClient;

/// Upper bound on the tile ids passed to a single density request.
pub const MAX_NB_TILES_REQUEST: usize = 100;

pub struct Grids<'a> {
    client: &'a dyn ApiClient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridKind {
    /// Municipality, by its SFOS number
    #[serde(alias = "municipalities")]
    Municipality,
    /// Postal code area (PLZ)
    #[serde(alias = "postal-code-areas")]
    PostalCodeArea,
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            GridKind::Municipality => "municipalities",
            GridKind::PostalCodeArea => "postal-code-areas",
        };
        write!(f, "{}", kind)
    }
}

impl GridKind {
    /// Singular name for messages, e.g. "municipality 351".
    pub fn label(&self) -> &'static str {
        match self {
            GridKind::Municipality => "municipality",
            GridKind::PostalCodeArea => "postal code",
        }
    }
}

impl std::str::FromStr for GridKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "municipality" | "municipalities" => Ok(GridKind::Municipality),
            "postal-code-area" | "postal-code-areas" | "plz" => Ok(GridKind::PostalCodeArea),
            other => Err(anyhow::anyhow!("unknown grid kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AreaIdentifier {
    pub kind: GridKind,
    pub id: u32,
}

impl AreaIdentifier {
    pub fn municipality(id: u32) -> Self {
        AreaIdentifier {
            kind: GridKind::Municipality,
            id,
        }
    }

    pub fn postal_code(id: u32) -> Self {
        AreaIdentifier {
            kind: GridKind::PostalCodeArea,
            id,
        }
    }
}

impl fmt::Display for AreaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// A grid as returned by the API. Only `tiles[].tileId` is interpreted;
/// the reply is kept as received and is what gets serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    pub tiles: Vec<Tile>,
    raw: Value,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    #[serde(rename = "tileId")]
    pub tile_id: u64,
}

#[derive(Deserialize)]
struct TileList {
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let TileList { tiles } = TileList::deserialize(&raw)?;
        Ok(TileGrid { tiles, raw })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The first `max` tile ids, in grid order.
    pub fn tile_ids(&self, max: usize) -> Vec<u64> {
        self.tiles.iter().take(max).map(|t| t.tile_id).collect()
    }
}

impl Serialize for TileGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'a> Grids<'a> {
    const URL: &'static str = "/grids";

    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self { client }
    }

    pub fn path(area: &AreaIdentifier) -> String {
        format!("{}/{}", Grids::URL, area)
    }

    /// Fetches the complete tile grid of an area (the API does not paginate).
    pub fn fetch(&self, area: &AreaIdentifier) -> Result<TileGrid, anyhow::Error> {
        let path = Grids::path(area);
        let reply = self.client.http_get(&path, &[])?;

        let grid = serde_json::from_str(&reply)
            .and_then(TileGrid::from_value)
            .map_err(crate::HeatmapsError::Json)
            .with_context(|| format!("parsing grid reply of {}", path))?;
        debug!("grid {} has {} tiles", area, grid.tiles.len());

        Ok(grid)
    }
}
