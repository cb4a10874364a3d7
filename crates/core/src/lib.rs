//! Deterministic procedural map-generation pipeline: hierarchical step
//! priorities, bit-exact noise/RNG engines, a stable ordered step
//! collection, and a single-shot scheduler over capability-typed contexts.
//! Given one 64-bit seed, a run reproduces its artifact byte for byte.

pub mod context;
pub mod error;
pub mod floor;
pub mod mapgen;
pub mod model;
pub mod priority;
pub mod random;
pub mod schedule;
pub mod step;

pub use context::{
    CapabilitySet, GenerationContext, PlaceOutcome, PlaceableAccess, PlanAccess, SeedSlot,
    TileAccess,
};
pub use error::GenError;
pub use mapgen::{MapGen, NoopObserver, RunObserver};
pub use model::{PlaceableKind, Pos, Rect, RoomPlan, Tile};
pub use priority::{Priority, PriorityError};
pub use random::{Noise, RandomError, Stream};
pub use schedule::{PriorityList, ScheduleError};
pub use step::{GenerationStep, WeightedPick};
