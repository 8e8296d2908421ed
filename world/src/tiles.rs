//! Tile registry: owns the tiles of a session and their stacking order.

use pinch_puzzle_core::{CellIndex, Position, TileId, TileSnapshot, TileView};
use rand::Rng;

use crate::Grid;

/// Hands out strictly increasing stacking values for a session.
///
/// Locked tiles sit at z 0, so issued values start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ZCounter {
    next: u32,
}

impl ZCounter {
    pub(crate) const fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn issue(&mut self) -> u32 {
        let value = self.next;
        self.next = self.next.saturating_add(1);
        value
    }

    /// Continues issuing directly above `highest`.
    fn resume_above(&mut self, highest: u32) {
        self.next = highest.saturating_add(1);
    }

    #[cfg(test)]
    pub(crate) const fn peek(&self) -> u32 {
        self.next
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Tile {
    id: TileId,
    correct: CellIndex,
    locked: bool,
    pub(crate) position: Position,
    z: u32,
}

impl Tile {
    pub(crate) const fn id(&self) -> TileId {
        self.id
    }

    pub(crate) const fn correct(&self) -> CellIndex {
        self.correct
    }

    pub(crate) const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Snaps the tile onto `cell_origin` and locks it for the rest of the session.
    pub(crate) fn lock_at(&mut self, cell_origin: Position) {
        self.position = cell_origin;
        self.locked = true;
        self.z = 0;
    }

    fn contains(&self, point: Position, tile_length: f32) -> bool {
        point.x >= self.position.x
            && point.x < self.position.x + tile_length
            && point.y >= self.position.y
            && point.y < self.position.y + tile_length
    }

    fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            id: self.id,
            correct: self.correct,
            locked: self.locked,
            position: self.position,
            z: self.z,
        }
    }
}

/// Collection of tiles indexed by identifier.
#[derive(Clone, Debug, Default)]
pub(crate) struct TileRegistry {
    tiles: Vec<Tile>,
}

impl TileRegistry {
    /// Creates one unlocked tile per cell, each resting in its own cell.
    pub(crate) fn create(grid: &Grid) -> Self {
        let tiles = (0..grid.size().tile_count())
            .map(|value| {
                let correct = CellIndex::new(value);
                Tile {
                    id: TileId::new(value),
                    correct,
                    locked: false,
                    position: grid.position_of(correct),
                    z: 0,
                }
            })
            .collect();
        Self { tiles }
    }

    /// Moves every unlocked tile to a uniformly random spot on the board.
    ///
    /// Tiles are stacked in scatter order, so the last one scattered ends up
    /// on top.
    pub(crate) fn scatter<R: Rng>(&mut self, grid: &Grid, rng: &mut R, z: &mut ZCounter) {
        let extent = grid.scatter_extent();
        for tile in self.tiles.iter_mut().filter(|tile| !tile.locked) {
            tile.position = Position::new(rng.gen_range(0.0..=extent), rng.gen_range(0.0..=extent));
            tile.z = z.issue();
        }
    }

    pub(crate) fn all_locked(&self) -> bool {
        !self.tiles.is_empty() && self.tiles.iter().all(|tile| tile.locked)
    }

    pub(crate) fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.get() as usize)
    }

    pub(crate) fn bring_to_front(&mut self, id: TileId, z: &mut ZCounter) {
        if let Some(tile) = self.get_mut(id) {
            tile.z = z.issue();
        }
    }

    /// Returns the highest tile whose square contains `point`, locked or not.
    pub(crate) fn topmost_at(&self, point: Position, tile_length: f32) -> Option<&Tile> {
        self.tiles
            .iter()
            .filter(|tile| tile.contains(point, tile_length))
            .max_by_key(|tile| (tile.z, !tile.locked))
    }

    /// Pushes locked tiles to the back and packs unlocked tiles into `1..=k`.
    ///
    /// Unlocked tiles keep their relative order, and the counter continues
    /// above the packed range.
    pub(crate) fn restack_after_lock(&mut self, z: &mut ZCounter) {
        let mut unlocked: Vec<usize> = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.locked)
            .map(|(index, _)| index)
            .collect();
        unlocked.sort_by_key(|&index| (self.tiles[index].z, self.tiles[index].id));

        let mut highest = 0;
        for index in unlocked {
            highest += 1;
            self.tiles[index].z = highest;
        }
        for tile in self.tiles.iter_mut().filter(|tile| tile.locked) {
            tile.z = 0;
        }
        z.resume_above(highest);
    }

    /// Scales every tile position, used when the board is resized.
    pub(crate) fn rescale(&mut self, factor: f32) {
        for tile in &mut self.tiles {
            tile.position = tile.position.scaled(factor);
        }
    }

    pub(crate) fn view(&self) -> TileView {
        TileView::from_snapshots(self.tiles.iter().map(Tile::snapshot).collect())
    }
}
