//! One straight-line run: dump grids, select tiles, query every hour of the
//! window in order, sum the scores.

use anyhow::Context;
use log::info;

use crate::api::density::{DensityScoreMap, DwellDensity};
use crate::api::grids::{AreaIdentifier, Grids};
use crate::config::RunConfig;
use crate::sink;
use crate::ApiClient;

#[derive(Debug)]
pub struct RunOutput {
    pub area: AreaIdentifier,
    pub tile_ids: Vec<u64>,
    pub scores: DensityScoreMap,
}

/// Runs with an already authenticated client. The first failure aborts the
/// run and the hourly totals gathered so far are dropped; grid files
/// written before the failure stay on disk.
pub fn run(client: &dyn ApiClient, config: &RunConfig) -> anyhow::Result<RunOutput> {
    let grids = Grids::new(client);

    for dump in &config.dumps {
        let area = dump.area();
        let grid = grids.fetch(&area)?;
        sink::dump_json(&grid, &dump.path)?;
        info!(
            "saved grid {} ({} tiles) to {}",
            area,
            grid.tiles.len(),
            dump.path.display()
        );
    }

    let grid = grids.fetch(&config.area)?;
    let tile_ids = grid.tile_ids(config.max_tiles);
    info!(
        "querying {} of {} tiles of {}",
        tile_ids.len(),
        grid.tiles.len(),
        config.area
    );

    let density = DwellDensity::new(client);
    let mut scores = DensityScoreMap::new();
    for hour in config.window.timestamps() {
        let tiles = density
            .hourly(&hour, &tile_ids)
            .with_context(|| format!("dwell density of {}", hour))?;
        let total = scores.record(&hour, &tiles)?;
        info!("{}: {}", hour, total);
    }

    Ok(RunOutput {
        area: config.area,
        tile_ids,
        scores,
    })
}
