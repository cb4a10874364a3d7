//! Generation context contract plus the optional capability interfaces a
//! concrete context may expose to steps. The core only calls through these
//! seams; it never implements or inspects the artifact behind them.

use bitflags::bitflags;

use crate::error::GenError;
use crate::model::{PlaceableKind, Pos, RoomPlan, Tile};
use crate::random::Stream;

bitflags! {
    /// Capability descriptor resolved once per step dispatch, replacing
    /// per-step runtime type inspection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilitySet: u8 {
        const TILES = 1;
        const PLAN = 1 << 1;
        const PLACEABLES = 1 << 2;
    }
}

/// Outcome of a placement request. Refusal is a value, not an exception:
/// the caller decides whether a refused placement is fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed,
    Refused,
}

impl PlaceOutcome {
    pub fn placed(self) -> bool {
        self == Self::Placed
    }
}

/// Tile read/write at a 2D coordinate.
pub trait TileAccess {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// `None` outside the grid.
    fn tile(&self, pos: Pos) -> Option<Tile>;
    fn place_tile(&mut self, pos: Pos, tile: Tile) -> PlaceOutcome;
}

/// Room/grid plan storage.
pub trait PlanAccess {
    fn plan(&self) -> &RoomPlan;
    fn plan_mut(&mut self) -> &mut RoomPlan;
}

/// Placeable-item queries keyed by item type.
pub trait PlaceableAccess {
    /// Cells currently eligible to hold `kind`, in a deterministic order.
    fn free_cells(&self, kind: PlaceableKind) -> Vec<Pos>;
    fn occupied(&self, pos: Pos) -> bool;
    fn place(&mut self, kind: PlaceableKind, pos: Pos) -> PlaceOutcome;
}

/// The mandatory contract every generation context implements. Lifecycle:
/// constructed fresh per run, seeded exactly once before any step, mutated
/// by the ordered steps, finalized exactly once after the last step.
pub trait GenerationContext {
    /// Installs the run seed. A second call is an error; the scheduler owns
    /// the single call site.
    fn init_seed(&mut self, seed: u64) -> Result<(), GenError>;

    /// The context's exclusively owned pseudorandom stream.
    fn rng(&mut self) -> &mut Stream;

    /// Hook invoked once after the last step.
    fn finalize(&mut self);

    /// Capability set this context supports; steps are matched against it.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::empty()
    }

    fn tile_access(&mut self) -> Option<&mut dyn TileAccess> {
        None
    }

    fn plan_access(&mut self) -> Option<&mut dyn PlanAccess> {
        None
    }

    fn placeable_access(&mut self) -> Option<&mut dyn PlaceableAccess> {
        None
    }
}

/// Owns a context's stream and enforces the seeded-exactly-once rule.
#[derive(Debug, Default)]
pub struct SeedSlot {
    stream: Option<Stream>,
}

impl SeedSlot {
    pub fn new() -> Self {
        Self { stream: None }
    }

    pub fn install(&mut self, seed: u64) -> Result<(), GenError> {
        if self.stream.is_some() {
            return Err(GenError::AlreadySeeded);
        }
        self.stream = Some(Stream::new(seed));
        Ok(())
    }

    pub fn is_seeded(&self) -> bool {
        self.stream.is_some()
    }

    /// Panics if the slot was never seeded. Unreachable through the
    /// scheduler, which seeds before the first step runs.
    pub fn stream(&mut self) -> &mut Stream {
        self.stream.as_mut().expect("context RNG accessed before seeding")
    }
}
