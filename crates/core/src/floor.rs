//! Concrete dungeon-floor context and the built-in steps that populate it.
//! This is the reference consumer of the pipeline: the scheduler and step
//! contracts never depend on it.

mod context;
mod steps;

pub use context::{FloorContext, FloorSnapshot, PlacedEntry, PlacedId, placeables, tiles};
pub use steps::{CarveCorridors, CarveRooms, FillTiles, PlaceStairs, PlanRooms, ScatterRubble};

use crate::error::GenError;
use crate::mapgen::MapGen;
use crate::priority::Priority;

/// The standard floor pipeline: initialize terrain, lay out rooms, draw
/// them onto tiles, decorate, then place the stairs.
pub fn standard_floor(width: usize, height: usize) -> Result<MapGen<FloorContext>, GenError> {
    let mut pipeline = MapGen::new(move || FloorContext::new(width, height));
    pipeline.register(Priority::single(-4), FillTiles::walls())?;
    pipeline.register(Priority::single(-2), PlanRooms::default())?;
    pipeline.register(Priority::single(0), CarveRooms)?;
    pipeline.register(Priority::single(0), CarveCorridors)?;
    pipeline.register(Priority::single(2), ScatterRubble::default())?;
    pipeline.register(Priority::single(4), PlaceStairs)?;
    Ok(pipeline)
}

/// One-shot convenience over [`standard_floor`].
pub fn generate_floor(seed: u64, width: usize, height: usize) -> Result<FloorContext, GenError> {
    standard_floor(width, height)?.run(seed)
}
