//! Built-in floor steps: terrain fill, room planning, carving, corridors,
//! noise-keyed decoration, and stair placement.

use crate::context::{CapabilitySet, GenerationContext, TileAccess};
use crate::error::GenError;
use crate::model::{Pos, Rect, Tile};
use crate::random::Noise;
use crate::step::GenerationStep;

use super::context::{placeables, tiles};

/// Resets every cell of the grid to one tile.
pub struct FillTiles {
    tile: Tile,
}

impl FillTiles {
    pub fn new(tile: Tile) -> Self {
        Self { tile }
    }

    pub fn walls() -> Self {
        Self::new(tiles::WALL)
    }
}

impl GenerationStep for FillTiles {
    fn name(&self) -> &str {
        "fill-tiles"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let Some(grid) = ctx.tile_access() else { return Ok(()) };
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                grid.place_tile(Pos { y: y as i32, x: x as i32 }, self.tile);
            }
        }
        Ok(())
    }
}

/// Plans non-overlapping room rectangles into the context's plan storage.
/// Rejected candidates cost attempts, not correctness: planning stops after
/// a bounded number of draws.
pub struct PlanRooms {
    pub max_rooms: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub margin: usize,
}

impl Default for PlanRooms {
    fn default() -> Self {
        Self { max_rooms: 8, min_size: 3, max_size: 7, margin: 1 }
    }
}

impl GenerationStep for PlanRooms {
    fn name(&self) -> &str {
        "plan-rooms"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES | CapabilitySet::PLAN
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let (width, height) = {
            let Some(grid) = ctx.tile_access() else { return Ok(()) };
            (grid.width(), grid.height())
        };
        // A room needs its extent plus a one-cell wall border on each side.
        if width < self.min_size + 2 || height < self.min_size + 2 {
            return Ok(());
        }
        let widest = self.max_size.min(width - 2);
        let tallest = self.max_size.min(height - 2);

        let mut rooms: Vec<Rect> = Vec::new();
        let attempts = self.max_rooms * 6;
        for _ in 0..attempts {
            if rooms.len() >= self.max_rooms {
                break;
            }
            let room_width = ctx.rng().next_in(self.min_size as i64, widest as i64)? as usize;
            let room_height = ctx.rng().next_in(self.min_size as i64, tallest as i64)? as usize;
            let x = ctx.rng().next_in(1, (width - 1 - room_width) as i64)? as usize;
            let y = ctx.rng().next_in(1, (height - 1 - room_height) as i64)? as usize;

            let candidate = Rect { x, y, width: room_width, height: room_height };
            let padded = candidate.expanded(self.margin);
            if !rooms.iter().any(|existing| padded.intersects(existing)) {
                rooms.push(candidate);
            }
        }

        let Some(storage) = ctx.plan_access() else { return Ok(()) };
        storage.plan_mut().rooms = rooms;
        Ok(())
    }
}

/// Carves every planned room rectangle down to floor tiles.
pub struct CarveRooms;

impl GenerationStep for CarveRooms {
    fn name(&self) -> &str {
        "carve-rooms"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES | CapabilitySet::PLAN
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let rooms: Vec<Rect> = {
            let Some(storage) = ctx.plan_access() else { return Ok(()) };
            storage.plan().rooms.clone()
        };
        let Some(grid) = ctx.tile_access() else { return Ok(()) };
        for room in rooms {
            for pos in room.cells() {
                grid.place_tile(pos, tiles::FLOOR);
            }
        }
        Ok(())
    }
}

/// Connects consecutive room centers with L-shaped corridors; the elbow
/// orientation of each link is one stream draw.
pub struct CarveCorridors;

impl GenerationStep for CarveCorridors {
    fn name(&self) -> &str {
        "carve-corridors"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES | CapabilitySet::PLAN
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let centers: Vec<Pos> = {
            let Some(storage) = ctx.plan_access() else { return Ok(()) };
            storage.plan().centers().collect()
        };
        if centers.len() < 2 {
            return Ok(());
        }

        let mut horizontal_first = Vec::with_capacity(centers.len() - 1);
        for _ in 1..centers.len() {
            horizontal_first.push(ctx.rng().next_below(2)? == 0);
        }

        let Some(grid) = ctx.tile_access() else { return Ok(()) };
        for (link, pair) in centers.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            if horizontal_first[link] {
                carve_horizontal(grid, from.y, from.x, to.x);
                carve_vertical(grid, to.x, from.y, to.y);
            } else {
                carve_vertical(grid, from.x, from.y, to.y);
                carve_horizontal(grid, to.y, from.x, to.x);
            }
        }
        Ok(())
    }
}

fn carve_horizontal(grid: &mut dyn TileAccess, y: i32, x0: i32, x1: i32) {
    for x in x0.min(x1)..=x0.max(x1) {
        grid.place_tile(Pos { y, x }, tiles::FLOOR);
    }
}

fn carve_vertical(grid: &mut dyn TileAccess, x: i32, y0: i32, y1: i32) {
    for y in y0.min(y1)..=y0.max(y1) {
        grid.place_tile(Pos { y, x }, tiles::FLOOR);
    }
}

/// Scatters rubble over floor tiles, keyed by positional noise so the
/// result is independent of visit order. One stream draw salts the field;
/// every cell decision is then a pure coordinate query.
pub struct ScatterRubble {
    pub per_mille: u64,
}

impl Default for ScatterRubble {
    fn default() -> Self {
        Self { per_mille: 60 }
    }
}

impl GenerationStep for ScatterRubble {
    fn name(&self) -> &str {
        "scatter-rubble"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let field = Noise::new(ctx.rng().next_u64());
        let Some(grid) = ctx.tile_access() else { return Ok(()) };
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pos = Pos { y: y as i32, x: x as i32 };
                if grid.tile(pos) != Some(tiles::FLOOR) {
                    continue;
                }
                if field.value_2d(x as u64, y as u64) % 1000 < self.per_mille {
                    grid.place_tile(pos, tiles::RUBBLE);
                }
            }
        }
        Ok(())
    }
}

/// Places the down stairs on one uniformly drawn free floor cell. A floor
/// with no eligible cell is a fatal run condition, not a silent skip.
pub struct PlaceStairs;

impl GenerationStep for PlaceStairs {
    fn name(&self) -> &str {
        "place-stairs"
    }

    fn requires(&self) -> CapabilitySet {
        CapabilitySet::TILES | CapabilitySet::PLACEABLES
    }

    fn apply(&self, ctx: &mut dyn GenerationContext) -> Result<(), GenError> {
        let cells = {
            let Some(slots) = ctx.placeable_access() else { return Ok(()) };
            slots.free_cells(placeables::DOWN_STAIRS)
        };
        if cells.is_empty() {
            return Err(GenError::StepFailed {
                step: "place-stairs".into(),
                message: "no free floor cell for the down stairs".into(),
            });
        }
        let pick = ctx.rng().next_below(cells.len() as i64)? as usize;
        let pos = cells[pick];

        {
            let Some(slots) = ctx.placeable_access() else { return Ok(()) };
            if !slots.place(placeables::DOWN_STAIRS, pos).placed() {
                return Err(GenError::PlacementRefused { pos });
            }
        }
        let Some(grid) = ctx.tile_access() else { return Ok(()) };
        if !grid.place_tile(pos, tiles::DOWN_STAIRS).placed() {
            return Err(GenError::PlacementRefused { pos });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::super::context::FloorContext;
    use super::super::generate_floor;
    use super::*;
    use crate::model::PlaceableKind;
    use crate::random::Stream;

    fn seeded(seed: u64, width: usize, height: usize) -> FloorContext {
        let mut ctx = FloorContext::new(width, height);
        ctx.init_seed(seed).unwrap();
        ctx
    }

    #[test]
    fn fill_tiles_covers_the_whole_grid() {
        let mut ctx = seeded(3, 6, 4);
        FillTiles::new(tiles::FLOOR).apply(&mut ctx).unwrap();
        for y in 0..4 {
            for x in 0..6 {
                assert_eq!(ctx.tile_at(Pos { y, x }), tiles::FLOOR);
            }
        }
    }

    #[test]
    fn planned_rooms_keep_their_margin_and_stay_inside_the_border() {
        let mut ctx = seeded(41, 20, 15);
        PlanRooms::default().apply(&mut ctx).unwrap();

        let rooms = ctx.rooms().to_vec();
        assert!(!rooms.is_empty(), "a 20x15 grid always fits at least one room");
        for (i, room) in rooms.iter().enumerate() {
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.right() <= 18 && room.bottom() <= 13);
            for other in rooms.iter().skip(i + 1) {
                assert!(!room.expanded(1).intersects(other));
            }
        }
    }

    #[test]
    fn carve_rooms_floors_exactly_the_planned_cells() {
        let mut ctx = seeded(7, 12, 10);
        let room = Rect { x: 2, y: 3, width: 4, height: 3 };
        ctx.plan_access().unwrap().plan_mut().push(room);
        CarveRooms.apply(&mut ctx).unwrap();

        for y in 0..10 {
            for x in 0..12 {
                let pos = Pos { y, x };
                let expected = if room.contains(pos) { tiles::FLOOR } else { tiles::WALL };
                assert_eq!(ctx.tile_at(pos), expected);
            }
        }
    }

    #[test]
    fn corridors_leave_a_walkable_path_between_room_centers() {
        let mut ctx = seeded(11, 20, 15);
        let storage = ctx.plan_access().unwrap().plan_mut();
        storage.push(Rect { x: 2, y: 2, width: 3, height: 3 });
        storage.push(Rect { x: 14, y: 10, width: 3, height: 3 });
        CarveRooms.apply(&mut ctx).unwrap();
        CarveCorridors.apply(&mut ctx).unwrap();

        assert!(walkable_cells_connected(&ctx));
    }

    #[test]
    fn rubble_is_keyed_by_position_not_visit_order() {
        let mut ctx = seeded(99, 16, 12);
        FillTiles::new(tiles::FLOOR).apply(&mut ctx).unwrap();
        ScatterRubble { per_mille: 500 }.apply(&mut ctx).unwrap();

        // FillTiles draws nothing, so the salt is the seed's first draw;
        // every cell must match an independent re-query of the noise field.
        let salt = Stream::new(99).next_u64();
        let field = Noise::new(salt);
        for y in 0..12_u64 {
            for x in 0..16_u64 {
                let expected = if field.value_2d(x, y) % 1000 < 500 {
                    tiles::RUBBLE
                } else {
                    tiles::FLOOR
                };
                assert_eq!(ctx.tile_at(Pos { y: y as i32, x: x as i32 }), expected);
            }
        }
    }

    #[test]
    fn stairs_fail_fatally_when_no_floor_exists() {
        let mut ctx = seeded(5, 8, 8);
        let failed = PlaceStairs.apply(&mut ctx);
        assert!(matches!(failed, Err(GenError::StepFailed { .. })));
    }

    #[test]
    fn stairs_land_on_a_previously_free_floor_cell() {
        let mut ctx = seeded(21, 20, 15);
        PlanRooms::default().apply(&mut ctx).unwrap();
        CarveRooms.apply(&mut ctx).unwrap();
        PlaceStairs.apply(&mut ctx).unwrap();

        let placed: Vec<(PlaceableKind, Pos)> = ctx.placed_items().collect();
        assert_eq!(placed.len(), 1);
        let (kind, pos) = placed[0];
        assert_eq!(kind, placeables::DOWN_STAIRS);
        assert_eq!(ctx.tile_at(pos), tiles::DOWN_STAIRS);
    }

    fn walkable_cells_connected(ctx: &FloorContext) -> bool {
        let width = ctx.width();
        let height = ctx.height();
        let walkable: Vec<Pos> = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Pos { y, x }))
            .filter(|&pos| tiles::walkable(ctx.tile_at(pos)))
            .collect();
        let Some(&start) = walkable.first() else { return true };

        let mut seen = std::collections::BTreeSet::new();
        let mut frontier = vec![start];
        seen.insert(start);
        while let Some(pos) = frontier.pop() {
            for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let next = Pos { y: pos.y + dy, x: pos.x + dx };
                if next.y < 0
                    || next.x < 0
                    || next.y >= height as i32
                    || next.x >= width as i32
                    || seen.contains(&next)
                    || !tiles::walkable(ctx.tile_at(next))
                {
                    continue;
                }
                seen.insert(next);
                frontier.push(next);
            }
        }
        seen.len() == walkable.len()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn standard_floors_stay_connected_and_keep_one_stairs(seed in any::<u64>()) {
            let floor = generate_floor(seed, 20, 15)
                .expect("the standard pipeline succeeds on a 20x15 grid");

            prop_assert!(walkable_cells_connected(&floor));

            let stairs: Vec<Pos> = floor
                .placed_items()
                .filter(|(kind, _)| *kind == placeables::DOWN_STAIRS)
                .map(|(_, pos)| pos)
                .collect();
            prop_assert_eq!(stairs.len(), 1);
            prop_assert_eq!(floor.tile_at(stairs[0]), tiles::DOWN_STAIRS);
        }
    }
}
