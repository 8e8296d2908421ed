//! Board geometry: conversions between pixel positions and grid cells.

use pinch_puzzle_core::{Cell, CellIndex, GridSize, Position, Viewport};

/// Share of the viewport's shorter edge covered by the board.
const BOARD_FRACTION: f32 = 0.9;

/// Describes the square board a session is played on.
///
/// Positions handled by the grid are board-local unless a method says
/// otherwise: `(0, 0)` is the top-left corner of the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    size: GridSize,
    board_size: f32,
    tile_length: f32,
    origin: Position,
}

impl Grid {
    /// Lays out an `N×N` board centred within the viewport.
    #[must_use]
    pub fn for_viewport(size: GridSize, viewport: Viewport) -> Self {
        let board_size = viewport.min_edge() * BOARD_FRACTION;
        let origin = Position::new(
            (viewport.width() - board_size) * 0.5,
            (viewport.height() - board_size) * 0.5,
        );
        Self {
            size,
            board_size,
            tile_length: board_size / size.get() as f32,
            origin,
        }
    }

    /// Number of tiles along each board edge.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Edge length of the board in pixels.
    #[must_use]
    pub const fn board_size(&self) -> f32 {
        self.board_size
    }

    /// Edge length of a single tile in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Top-left corner of the board in viewport coordinates.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Maps a tile's top-left corner to the nearest cell.
    ///
    /// Positions outside the board round to cells outside `0..N`; they are
    /// never clamped onto the board.
    #[must_use]
    pub fn cell_of(&self, position: Position) -> Cell {
        let column = (position.x / self.tile_length).round();
        let row = (position.y / self.tile_length).round();
        Cell::new(row as i32, column as i32)
    }

    /// Linear index of an on-board cell, or `None` for cells off the board.
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<CellIndex> {
        let edge = self.size.get();
        let row = u32::try_from(cell.row()).ok()?;
        let column = u32::try_from(cell.column()).ok()?;
        if row >= edge || column >= edge {
            return None;
        }
        Some(CellIndex::new(row * edge + column))
    }

    /// Top-left corner of the cell with the provided index.
    #[must_use]
    pub fn position_of(&self, index: CellIndex) -> Position {
        let edge = self.size.get();
        let column = index.get() % edge;
        let row = index.get() / edge;
        Position::new(
            column as f32 * self.tile_length,
            row as f32 * self.tile_length,
        )
    }

    /// Converts a viewport position into board coordinates.
    #[must_use]
    pub fn to_board(&self, viewport_position: Position) -> Position {
        viewport_position - self.origin
    }

    /// Converts a board position into viewport coordinates.
    #[must_use]
    pub fn to_viewport(&self, board_position: Position) -> Position {
        board_position + self.origin
    }

    /// Largest coordinate a scattered tile's corner may take on either axis.
    #[must_use]
    pub fn scatter_extent(&self) -> f32 {
        (self.board_size - self.tile_length).max(0.0)
    }
}
