#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pinch Puzzle engine.
//!
//! This crate defines the message surface that connects adapters, input
//! systems and the authoritative puzzle session. Input systems submit
//! [`Command`] values describing the interaction they observed, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that systems and adapters react to on the next frame.

use std::{
    ops::{Add, Sub},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Banner raised when every tile has been locked into place.
pub const COMPLETION_BANNER: &str = "Puzzle complete!";

/// Viewport assumed until an adapter reports the real window size.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

/// Grid dimensions offered by the size selector.
pub const SELECTABLE_GRID_SIZES: [GridSize; 3] = [GridSize(3), GridSize(4), GridSize(5)];

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Reports the size of the surface the board is laid out on.
    ConfigureViewport {
        /// Dimensions of the drawable area in pixels.
        viewport: Viewport,
    },
    /// Updates how long the solved image is shown before the tiles scatter.
    ConfigurePreview {
        /// Delay between starting a game and scattering its tiles.
        delay: Duration,
    },
    /// Reports that the puzzle image finished loading.
    ImageLoaded {
        /// Width of the decoded image in pixels.
        width: u32,
        /// Height of the decoded image in pixels.
        height: u32,
    },
    /// Reports that an external resource could not be initialised.
    ReportResourceFailure {
        /// Resource that failed.
        resource: Resource,
        /// Human readable description of the failure.
        reason: String,
    },
    /// Starts a fresh session, discarding any game in progress.
    StartGame {
        /// Number of tiles along each board edge.
        size: GridSize,
        /// Seed driving the tile scatter.
        seed: u64,
    },
    /// Pauses or resumes the running session.
    SetPaused {
        /// Whether the session should be paused.
        paused: bool,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of wall time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Attempts to pick up the tile under the provided point.
    Grab {
        /// Input modality requesting the grab.
        modality: Modality,
        /// Point in viewport coordinates.
        at: Position,
    },
    /// Moves the tile held by the modality so the grab point follows `to`.
    Drag {
        /// Input modality that owns the grab.
        modality: Modality,
        /// New grab point in viewport coordinates.
        to: Position,
    },
    /// Drops the tile held by the modality.
    Release {
        /// Input modality that owns the grab.
        modality: Modality,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms the viewport used for board layout.
    ViewportConfigured {
        /// Dimensions of the drawable area in pixels.
        viewport: Viewport,
    },
    /// Confirms that the puzzle image is available.
    ImageReady {
        /// Width of the image in pixels.
        width: u32,
        /// Height of the image in pixels.
        height: u32,
    },
    /// Reports that an external resource failed and how the session reacted.
    ResourceFailed {
        /// Resource that failed.
        resource: Resource,
        /// Human readable description of the failure.
        reason: String,
    },
    /// Reports that a start request could not be honoured.
    StartRejected {
        /// Why the session did not start.
        reason: StartRejection,
    },
    /// Announces that a new session began with tiles in solved layout.
    GameStarted {
        /// Number of tiles along each board edge.
        size: GridSize,
        /// Edge length of the square board in pixels.
        board_size: f32,
    },
    /// Announces that the preview ended and the tiles were scattered.
    TilesScattered,
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of session time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session was paused or resumed.
    PauseChanged {
        /// Whether the session is now paused.
        paused: bool,
    },
    /// Confirms that a modality picked up a tile.
    TileGrabbed {
        /// Tile that was picked up.
        tile: TileId,
        /// Modality now holding the tile.
        modality: Modality,
    },
    /// Reports that a grab attempt picked up nothing.
    GrabIgnored {
        /// Modality that attempted the grab.
        modality: Modality,
        /// Why nothing was picked up.
        reason: GrabRejection,
    },
    /// Confirms that a held tile moved.
    TileMoved {
        /// Tile that moved.
        tile: TileId,
        /// New top-left corner in board coordinates.
        position: Position,
    },
    /// Reports the updated move counter.
    MovesChanged {
        /// Number of releases performed this session.
        moves: u32,
    },
    /// Confirms that a held tile was dropped and how the drop resolved.
    TileReleased {
        /// Tile that was dropped.
        tile: TileId,
        /// Modality that held the tile.
        modality: Modality,
        /// Cell nearest to the drop position.
        cell: Cell,
        /// Whether the tile locked into place.
        outcome: DropOutcome,
    },
    /// Announces that every tile is locked.
    PuzzleCompleted {
        /// Number of moves the player needed.
        moves: u32,
        /// Session time spent solving.
        elapsed: Duration,
    },
}

/// Lifecycle states of a puzzle session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No session has been started yet.
    Idle,
    /// A session is running and accepts input.
    Playing,
    /// The session is suspended; no time accrues and no grabs are accepted.
    Paused,
    /// Every tile is locked. Only a new game leaves this state.
    Completed,
    /// A resource required to play could not be loaded.
    Failed(Resource),
}

/// Input modalities able to move tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Mouse, touch or pen dragging directly on the tiles.
    Pointer,
    /// Hand-tracked cursor derived from camera frames.
    Camera,
}

/// External resources the session depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// The puzzle image.
    Image,
    /// The camera feeding the hand tracker.
    Camera,
    /// The hand-tracking model.
    HandTracker,
}

/// Reasons a grab attempt did not pick up a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrabRejection {
    /// No session is running.
    NotPlaying,
    /// The session is paused.
    Paused,
    /// The solved image is still being previewed; every tile rests in its
    /// own cell, so a single click would lock it.
    Previewing,
    /// Another modality already holds a tile.
    Busy {
        /// Modality holding the active grab.
        holder: Modality,
    },
    /// No tile lies under the grab point.
    NoTile,
    /// The tile under the grab point is already locked.
    Locked,
}

/// Reasons a start request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartRejection {
    /// The puzzle image has not loaded or failed to load.
    ImageUnavailable,
}

/// Result of resolving a drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropOutcome {
    /// The tile landed in its own cell and is now locked.
    Locked,
    /// The tile stays where it was dropped.
    Loose,
}

/// Unique identifier assigned to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Linear index of a cell that lies on the board (`row * N + column`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Grid cell addressed by row and column.
///
/// Rounding a position that lies outside the board yields coordinates outside
/// `0..N`, so both components are signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    row: i32,
    column: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Row of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }
}

/// Largest supported number of tiles along a board edge.
pub const MAX_GRID_SIZE: u32 = 64;

/// Number of tiles along each edge of the square board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridSize(u32);

impl GridSize {
    /// Validates and wraps a grid dimension in `1..=MAX_GRID_SIZE`.
    pub const fn new(value: u32) -> Result<Self, PuzzleError> {
        if value == 0 || value > MAX_GRID_SIZE {
            return Err(PuzzleError::InvalidGridSize { size: value });
        }
        Ok(Self(value))
    }

    /// Retrieves the number of tiles along one edge.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Total number of tiles on the board.
    #[must_use]
    pub const fn tile_count(&self) -> u32 {
        self.0 * self.0
    }
}

impl TryFrom<u32> for GridSize {
    type Error = PuzzleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GridSize> for u32 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

/// Point or offset in pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal component, growing to the right.
    pub x: f32,
    /// Vertical component, growing downwards.
    pub y: f32,
}

impl Position {
    /// Origin of the coordinate space.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiplies both components by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Moves `fraction` of the way towards `target`.
    #[must_use]
    pub fn lerp(self, target: Self, fraction: f32) -> Self {
        Self::new(
            self.x + (target.x - self.x) * fraction,
            self.y + (target.y - self.y) * fraction,
        )
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Dimensions of the drawable surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Validates and wraps viewport dimensions.
    pub fn new(width: f32, height: f32) -> Result<Self, PuzzleError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PuzzleError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width of the viewport in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the viewport in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Length of the shorter edge.
    #[must_use]
    pub fn min_edge(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Immutable representation of a single tile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Unique identifier assigned to the tile.
    pub id: TileId,
    /// Cell the tile belongs in.
    pub correct: CellIndex,
    /// Whether the tile is locked into its cell.
    pub locked: bool,
    /// Top-left corner in board coordinates.
    pub position: Position,
    /// Stacking rank; higher values draw on top.
    pub z: u32,
}

/// Read-only snapshot describing every tile of the session.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view, ordering snapshots by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single tile.
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&TileSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of tiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TileSnapshot> {
        self.snapshots
    }
}

/// Cancellable one-shot countdown driven by explicit time deltas.
///
/// Deferred actions belong to the session that armed them; restarting the
/// session cancels them instead of letting stale timers fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Deferred {
    remaining: Option<Duration>,
}

impl Deferred {
    /// Creates an idle countdown.
    #[must_use]
    pub const fn idle() -> Self {
        Self { remaining: None }
    }

    /// Starts (or restarts) the countdown.
    pub fn arm(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    /// Stops the countdown without firing.
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Reports whether the countdown is running.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advances the countdown, returning `true` exactly once when it expires.
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(remaining) if dt >= remaining => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - dt);
                false
            }
            None => false,
        }
    }
}

/// Producer of grab/drag/release commands for one input modality.
///
/// Every implementation funnels its raw input into the same command triple
/// so the world's drop resolution never depends on where input came from.
pub trait InputAdapter {
    /// Raw input sampled by the adapter each frame.
    type Input;

    /// Modality stamped on every command the adapter emits.
    fn modality(&self) -> Modality;

    /// Consumes the events broadcast since the previous frame together with
    /// this frame's raw input and appends the resulting commands to `out`.
    fn handle(&mut self, events: &[Event], input: Self::Input, out: &mut Vec<Command>);
}

/// Errors raised when constructing core values.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PuzzleError {
    /// Boards need between one and `MAX_GRID_SIZE` tiles per edge.
    #[error("grid size must lie in 1..={} (received {size})", MAX_GRID_SIZE)]
    InvalidGridSize {
        /// Rejected edge length.
        size: u32,
    },
    /// Viewports need finite positive dimensions.
    #[error("viewport must have positive finite dimensions (received {width}x{height})")]
    InvalidViewport {
        /// Rejected width.
        width: f32,
        /// Rejected height.
        height: f32,
    },
    /// Hand landmark sets must contain the thumb and index fingertips.
    #[error("hand landmark set has {len} points, expected at least {expected}")]
    IncompleteLandmarks {
        /// Number of points supplied.
        len: usize,
        /// Minimum number of points required.
        expected: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_rejects_zero() {
        assert_eq!(
            GridSize::new(0),
            Err(PuzzleError::InvalidGridSize { size: 0 })
        );
        assert_eq!(GridSize::new(4).map(|size| size.tile_count()), Ok(16));
    }

    #[test]
    fn grid_size_is_capped_before_tile_count_overflows() {
        assert_eq!(
            GridSize::new(MAX_GRID_SIZE).map(|size| size.tile_count()),
            Ok(MAX_GRID_SIZE * MAX_GRID_SIZE)
        );
        assert_eq!(
            GridSize::new(70_000),
            Err(PuzzleError::InvalidGridSize { size: 70_000 })
        );
    }

    #[test]
    fn oversized_grid_is_rejected_on_decode() {
        let bytes = bincode::serialize(&70_000_u32).expect("integer serializes");

        assert!(bincode::deserialize::<GridSize>(&bytes).is_err());
    }

    #[test]
    fn viewport_rejects_degenerate_dimensions() {
        assert!(Viewport::new(0.0, 100.0).is_err());
        assert!(Viewport::new(100.0, f32::NAN).is_err());
        let viewport = Viewport::new(800.0, 600.0).expect("valid viewport");
        assert_eq!(viewport.min_edge(), 600.0);
    }

    #[test]
    fn deferred_fires_once_after_delay() {
        let mut deferred = Deferred::idle();
        deferred.arm(Duration::from_millis(150));

        assert!(!deferred.advance(Duration::from_millis(100)));
        assert!(deferred.is_armed());
        assert!(deferred.advance(Duration::from_millis(50)));
        assert!(!deferred.is_armed());
        assert!(!deferred.advance(Duration::from_secs(1)));
    }

    #[test]
    fn cancelled_deferred_never_fires() {
        let mut deferred = Deferred::idle();
        deferred.arm(Duration::from_secs(5));
        deferred.cancel();

        assert!(!deferred.advance(Duration::from_secs(10)));
    }

    #[test]
    fn commands_survive_binary_transport() {
        let command = Command::Grab {
            modality: Modality::Camera,
            at: Position::new(12.5, 40.0),
        };
        let bytes = bincode::serialize(&command).expect("command serializes");
        let decoded: Command = bincode::deserialize(&bytes).expect("command deserializes");

        assert_eq!(decoded, command);
    }
}
