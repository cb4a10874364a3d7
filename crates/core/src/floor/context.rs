//! Grid-of-tiles floor context implementing every optional capability.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use xxhash_rust::xxh3::xxh3_64;

use crate::context::{
    CapabilitySet, GenerationContext, PlaceOutcome, PlaceableAccess, PlanAccess, SeedSlot,
    TileAccess,
};
use crate::error::GenError;
use crate::model::{PlaceableKind, Pos, Rect, RoomPlan, Tile};
use crate::random::Stream;

/// Tile vocabulary of the floor context.
pub mod tiles {
    use crate::model::Tile;

    pub const WALL: Tile = Tile(0);
    pub const FLOOR: Tile = Tile(1);
    pub const RUBBLE: Tile = Tile(2);
    pub const DOWN_STAIRS: Tile = Tile(3);

    pub fn walkable(tile: Tile) -> bool {
        tile == FLOOR || tile == RUBBLE || tile == DOWN_STAIRS
    }
}

/// Placeable vocabulary of the floor context.
pub mod placeables {
    use crate::model::PlaceableKind;

    pub const DOWN_STAIRS: PlaceableKind = PlaceableKind(0);
    pub const TREASURE: PlaceableKind = PlaceableKind(1);
}

new_key_type! {
    pub struct PlacedId;
}

#[derive(Clone, Copy, Debug)]
struct Placed {
    kind: PlaceableKind,
    pos: Pos,
}

/// A placed item in the exported snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedEntry {
    pub kind: PlaceableKind,
    pub pos: Pos,
}

/// Serializable export of a finished floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<u16>,
    pub rooms: Vec<Rect>,
    pub placements: Vec<PlacedEntry>,
    pub fingerprint: u64,
}

pub struct FloorContext {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    plan: RoomPlan,
    placed: SlotMap<PlacedId, Placed>,
    occupied: BTreeSet<Pos>,
    rng: SeedSlot,
    finalized: bool,
}

impl FloorContext {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 3 && height >= 3, "floor grids need at least a 3x3 extent");
        Self {
            width,
            height,
            tiles: vec![tiles::WALL; width * height],
            plan: RoomPlan::default(),
            placed: SlotMap::with_key(),
            occupied: BTreeSet::new(),
            rng: SeedSlot::new(),
            finalized: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Tile at `pos`; panics outside the grid.
    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.tiles[self.index(pos).expect("tile_at position out of bounds")]
    }

    pub fn rooms(&self) -> &[Rect] {
        &self.plan.rooms
    }

    pub fn placed_items(&self) -> impl Iterator<Item = (PlaceableKind, Pos)> + '_ {
        self.placed.values().map(|item| (item.kind, item.pos))
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    fn kind_allows(&self, kind: PlaceableKind, tile: Tile) -> bool {
        // Stairs demand clean floor; other placeables tolerate rubble.
        if kind == placeables::DOWN_STAIRS { tile == tiles::FLOOR } else { tiles::walkable(tile) }
    }

    /// Stable byte encoding of the full observable state, for fingerprints
    /// and byte-identity comparisons across runs.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            bytes.extend(tile.0.to_le_bytes());
        }
        bytes.extend((self.plan.rooms.len() as u32).to_le_bytes());
        for room in &self.plan.rooms {
            bytes.extend((room.x as u32).to_le_bytes());
            bytes.extend((room.y as u32).to_le_bytes());
            bytes.extend((room.width as u32).to_le_bytes());
            bytes.extend((room.height as u32).to_le_bytes());
        }
        let mut placements: Vec<(PlaceableKind, Pos)> = self.placed_items().collect();
        placements.sort();
        bytes.extend((placements.len() as u32).to_le_bytes());
        for (kind, pos) in placements {
            bytes.extend(kind.0.to_le_bytes());
            bytes.extend(pos.y.to_le_bytes());
            bytes.extend(pos.x.to_le_bytes());
        }
        bytes
    }

    pub fn snapshot_hash(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    pub fn snapshot(&self) -> FloorSnapshot {
        let mut placements: Vec<PlacedEntry> =
            self.placed_items().map(|(kind, pos)| PlacedEntry { kind, pos }).collect();
        placements.sort_by_key(|entry| (entry.kind, entry.pos));
        FloorSnapshot {
            width: self.width,
            height: self.height,
            tiles: self.tiles.iter().map(|tile| tile.0).collect(),
            rooms: self.plan.rooms.clone(),
            placements,
            fingerprint: self.snapshot_hash(),
        }
    }
}

impl GenerationContext for FloorContext {
    fn init_seed(&mut self, seed: u64) -> Result<(), GenError> {
        self.rng.install(seed)
    }

    fn rng(&mut self) -> &mut Stream {
        self.rng.stream()
    }

    fn finalize(&mut self) {
        assert!(!self.finalized, "finalize hook ran twice");
        self.finalized = true;
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::TILES | CapabilitySet::PLAN | CapabilitySet::PLACEABLES
    }

    fn tile_access(&mut self) -> Option<&mut dyn TileAccess> {
        Some(self)
    }

    fn plan_access(&mut self) -> Option<&mut dyn PlanAccess> {
        Some(self)
    }

    fn placeable_access(&mut self) -> Option<&mut dyn PlaceableAccess> {
        Some(self)
    }
}

impl TileAccess for FloorContext {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn tile(&self, pos: Pos) -> Option<Tile> {
        self.index(pos).map(|index| self.tiles[index])
    }

    fn place_tile(&mut self, pos: Pos, tile: Tile) -> PlaceOutcome {
        match self.index(pos) {
            Some(index) => {
                self.tiles[index] = tile;
                PlaceOutcome::Placed
            }
            None => PlaceOutcome::Refused,
        }
    }
}

impl PlanAccess for FloorContext {
    fn plan(&self) -> &RoomPlan {
        &self.plan
    }

    fn plan_mut(&mut self) -> &mut RoomPlan {
        &mut self.plan
    }
}

impl PlaceableAccess for FloorContext {
    fn free_cells(&self, kind: PlaceableKind) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { y: y as i32, x: x as i32 };
                if self.occupied.contains(&pos) {
                    continue;
                }
                if self.kind_allows(kind, self.tile_at(pos)) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    fn occupied(&self, pos: Pos) -> bool {
        self.occupied.contains(&pos)
    }

    fn place(&mut self, kind: PlaceableKind, pos: Pos) -> PlaceOutcome {
        let Some(index) = self.index(pos) else {
            return PlaceOutcome::Refused;
        };
        if self.occupied.contains(&pos) || !self.kind_allows(kind, self.tiles[index]) {
            return PlaceOutcome::Refused;
        }
        self.placed.insert(Placed { kind, pos });
        self.occupied.insert(pos);
        PlaceOutcome::Placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(width: usize, height: usize) -> FloorContext {
        let mut ctx = FloorContext::new(width, height);
        ctx.init_seed(1).unwrap();
        ctx
    }

    #[test]
    fn tile_writes_refuse_out_of_bounds_positions() {
        let mut ctx = seeded(5, 4);
        assert!(ctx.place_tile(Pos { y: 1, x: 1 }, tiles::FLOOR).placed());
        assert_eq!(ctx.place_tile(Pos { y: 4, x: 0 }, tiles::FLOOR), PlaceOutcome::Refused);
        assert_eq!(ctx.place_tile(Pos { y: -1, x: 0 }, tiles::FLOOR), PlaceOutcome::Refused);
        assert_eq!(ctx.tile_at(Pos { y: 1, x: 1 }), tiles::FLOOR);
    }

    #[test]
    fn placement_rules_are_keyed_by_item_kind() {
        let mut ctx = seeded(5, 5);
        ctx.place_tile(Pos { y: 2, x: 2 }, tiles::RUBBLE);

        // Stairs refuse rubble; treasure tolerates it.
        assert_eq!(
            ctx.place(placeables::DOWN_STAIRS, Pos { y: 2, x: 2 }),
            PlaceOutcome::Refused
        );
        assert!(ctx.place(placeables::TREASURE, Pos { y: 2, x: 2 }).placed());

        // The cell is occupied now, whatever the kind.
        assert!(ctx.occupied(Pos { y: 2, x: 2 }));
        assert_eq!(ctx.place(placeables::TREASURE, Pos { y: 2, x: 2 }), PlaceOutcome::Refused);
    }

    #[test]
    fn free_cells_enumerate_row_major_and_respect_occupancy() {
        let mut ctx = seeded(4, 3);
        ctx.place_tile(Pos { y: 1, x: 1 }, tiles::FLOOR);
        ctx.place_tile(Pos { y: 1, x: 2 }, tiles::FLOOR);
        assert_eq!(
            ctx.free_cells(placeables::DOWN_STAIRS),
            vec![Pos { y: 1, x: 1 }, Pos { y: 1, x: 2 }]
        );

        ctx.place(placeables::DOWN_STAIRS, Pos { y: 1, x: 1 });
        assert_eq!(ctx.free_cells(placeables::DOWN_STAIRS), vec![Pos { y: 1, x: 2 }]);
    }

    #[test]
    fn canonical_bytes_capture_placements_independent_of_insertion_order() {
        let mut first = seeded(4, 4);
        let mut second = seeded(4, 4);
        for ctx in [&mut first, &mut second] {
            ctx.place_tile(Pos { y: 1, x: 1 }, tiles::FLOOR);
            ctx.place_tile(Pos { y: 2, x: 2 }, tiles::FLOOR);
        }
        first.place(placeables::DOWN_STAIRS, Pos { y: 1, x: 1 });
        first.place(placeables::TREASURE, Pos { y: 2, x: 2 });
        second.place(placeables::TREASURE, Pos { y: 2, x: 2 });
        second.place(placeables::DOWN_STAIRS, Pos { y: 1, x: 1 });

        assert_eq!(first.canonical_bytes(), second.canonical_bytes());
        assert_eq!(first.snapshot_hash(), second.snapshot_hash());
    }
}
