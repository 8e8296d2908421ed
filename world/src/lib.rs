#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative puzzle session state for Pinch Puzzle.
//!
//! The [`World`] owns the board geometry, the tiles and the session
//! bookkeeping. Every mutation flows through [`apply`], which executes a
//! single [`Command`] and reports what happened as [`Event`] values.

mod drop;
mod grid;
mod tiles;

use std::time::Duration;

use pinch_puzzle_core::{
    Command, Deferred, Event, GameState, GrabRejection, GridSize, Modality, Position, Resource,
    StartRejection, TileId, Viewport, DEFAULT_VIEWPORT,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use grid::Grid;

use tiles::{TileRegistry, ZCounter};

/// How long the solved image is shown before the tiles scatter.
pub const DEFAULT_PREVIEW_DELAY: Duration = Duration::from_secs(5);

/// Dimensions of the loaded puzzle image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    width: u32,
    height: u32,
}

impl ImageInfo {
    /// Width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Availability of the camera-driven input path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingStatus {
    /// No failure has been reported.
    Available,
    /// The camera or the hand tracker failed; only pointer input remains.
    Unavailable {
        /// Resource that failed.
        resource: Resource,
        /// Human readable description of the failure.
        reason: String,
    },
}

/// The single tile currently held by an input modality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grab {
    tile: TileId,
    modality: Modality,
    offset: Position,
}

impl Grab {
    /// Tile being held.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        self.tile
    }

    /// Modality holding the tile.
    #[must_use]
    pub const fn modality(&self) -> Modality {
        self.modality
    }

    /// Grab point relative to the tile's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> Position {
        self.offset
    }
}

#[derive(Debug)]
struct Session {
    grid: Grid,
    tiles: TileRegistry,
    moves: u32,
    elapsed: Duration,
    z: ZCounter,
    previewing: bool,
    scatter: Deferred,
    rng: ChaCha8Rng,
    active_grab: Option<Grab>,
}

/// Represents the authoritative Pinch Puzzle session state.
#[derive(Debug)]
pub struct World {
    viewport: Viewport,
    preview_delay: Duration,
    image: Option<ImageInfo>,
    tracking: TrackingStatus,
    state: GameState,
    session: Option<Session>,
}

impl World {
    /// Creates an idle world awaiting its image and first game.
    #[must_use]
    pub fn new() -> Self {
        Self {
            viewport: DEFAULT_VIEWPORT,
            preview_delay: DEFAULT_PREVIEW_DELAY,
            image: None,
            tracking: TrackingStatus::Available,
            state: GameState::Idle,
            session: None,
        }
    }

    fn configure_viewport(&mut self, viewport: Viewport, out_events: &mut Vec<Event>) {
        self.viewport = viewport;
        if let Some(session) = self.session.as_mut() {
            let grid = Grid::for_viewport(session.grid.size(), viewport);
            let factor = grid.board_size() / session.grid.board_size();
            session.tiles.rescale(factor);
            if let Some(grab) = session.active_grab.as_mut() {
                grab.offset = grab.offset.scaled(factor);
            }
            session.grid = grid;
        }
        out_events.push(Event::ViewportConfigured { viewport });
    }

    fn image_loaded(&mut self, width: u32, height: u32, out_events: &mut Vec<Event>) {
        self.image = Some(ImageInfo { width, height });
        if self.state == GameState::Failed(Resource::Image) {
            self.state = GameState::Idle;
        }
        out_events.push(Event::ImageReady { width, height });
    }

    fn resource_failed(&mut self, resource: Resource, reason: String, out_events: &mut Vec<Event>) {
        warn!(?resource, %reason, "resource failed");
        match resource {
            Resource::Image => {
                self.image = None;
                self.session = None;
                self.state = GameState::Failed(Resource::Image);
            }
            Resource::Camera | Resource::HandTracker => {
                self.tracking = TrackingStatus::Unavailable {
                    resource,
                    reason: reason.clone(),
                };
                self.release(Modality::Camera, out_events);
            }
        }
        out_events.push(Event::ResourceFailed { resource, reason });
    }

    fn start_game(&mut self, size: GridSize, seed: u64, out_events: &mut Vec<Event>) {
        if self.image.is_none() {
            warn!(size = size.get(), "start requested before the image loaded");
            out_events.push(Event::StartRejected {
                reason: StartRejection::ImageUnavailable,
            });
            return;
        }

        let grid = Grid::for_viewport(size, self.viewport);
        let mut scatter = Deferred::idle();
        scatter.arm(self.preview_delay);
        // Replacing the session drops its pending scatter and any held tile.
        self.session = Some(Session {
            grid,
            tiles: TileRegistry::create(&grid),
            moves: 0,
            elapsed: Duration::ZERO,
            z: ZCounter::new(),
            previewing: true,
            scatter,
            rng: ChaCha8Rng::seed_from_u64(seed),
            active_grab: None,
        });
        self.state = GameState::Playing;
        info!(size = size.get(), seed, "game started");
        out_events.push(Event::GameStarted {
            size,
            board_size: grid.board_size(),
        });
    }

    fn set_paused(&mut self, paused: bool, out_events: &mut Vec<Event>) {
        match (self.state, paused) {
            (GameState::Playing, true) => {
                if let Some(session) = self.session.as_mut() {
                    if let Some(grab) = session.active_grab.take() {
                        drop::resolve(session, &mut self.state, grab, out_events);
                    }
                }
                if self.state == GameState::Completed {
                    return;
                }
                self.state = GameState::Paused;
                out_events.push(Event::PauseChanged { paused: true });
            }
            (GameState::Paused, false) => {
                self.state = GameState::Playing;
                out_events.push(Event::PauseChanged { paused: false });
            }
            (state, _) => {
                debug!(?state, paused, "pause request ignored");
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.state != GameState::Playing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.elapsed = session.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        if session.scatter.advance(dt) {
            let grid = session.grid;
            session.tiles.scatter(&grid, &mut session.rng, &mut session.z);
            session.previewing = false;
            info!(tiles = grid.size().tile_count(), "tiles scattered");
            out_events.push(Event::TilesScattered);
        }
    }

    fn grab(&mut self, modality: Modality, at: Position, out_events: &mut Vec<Event>) {
        match self.try_grab(modality, at) {
            Ok(tile) => {
                debug!(tile = tile.get(), ?modality, "tile grabbed");
                out_events.push(Event::TileGrabbed { tile, modality });
            }
            Err(reason) => {
                debug!(?modality, ?reason, "grab ignored");
                out_events.push(Event::GrabIgnored { modality, reason });
            }
        }
    }

    fn try_grab(&mut self, modality: Modality, at: Position) -> Result<TileId, GrabRejection> {
        match self.state {
            GameState::Playing => {}
            GameState::Paused => return Err(GrabRejection::Paused),
            GameState::Idle | GameState::Completed | GameState::Failed(_) => {
                return Err(GrabRejection::NotPlaying)
            }
        }
        let session = self.session.as_mut().ok_or(GrabRejection::NotPlaying)?;
        if session.previewing {
            return Err(GrabRejection::Previewing);
        }
        if let Some(grab) = session.active_grab {
            return Err(GrabRejection::Busy {
                holder: grab.modality,
            });
        }

        let point = session.grid.to_board(at);
        let tile = session
            .tiles
            .topmost_at(point, session.grid.tile_length())
            .ok_or(GrabRejection::NoTile)?;
        if tile.is_locked() {
            return Err(GrabRejection::Locked);
        }

        let id = tile.id();
        let offset = point - tile.position;
        session.tiles.bring_to_front(id, &mut session.z);
        session.active_grab = Some(Grab {
            tile: id,
            modality,
            offset,
        });
        Ok(id)
    }

    fn drag(&mut self, modality: Modality, to: Position, out_events: &mut Vec<Event>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(grab) = session.active_grab.filter(|grab| grab.modality == modality) else {
            return;
        };
        let position = session.grid.to_board(to) - grab.offset;
        if let Some(tile) = session.tiles.get_mut(grab.tile) {
            tile.position = position;
            out_events.push(Event::TileMoved {
                tile: grab.tile,
                position,
            });
        }
    }

    fn release(&mut self, modality: Modality, out_events: &mut Vec<Event>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session
            .active_grab
            .map_or(true, |grab| grab.modality != modality)
        {
            return;
        }
        if let Some(grab) = session.active_grab.take() {
            drop::resolve(session, &mut self.state, grab, out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureViewport { viewport } => world.configure_viewport(viewport, out_events),
        Command::ConfigurePreview { delay } => world.preview_delay = delay,
        Command::ImageLoaded { width, height } => world.image_loaded(width, height, out_events),
        Command::ReportResourceFailure { resource, reason } => {
            world.resource_failed(resource, reason, out_events);
        }
        Command::StartGame { size, seed } => world.start_game(size, seed, out_events),
        Command::SetPaused { paused } => world.set_paused(paused, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Grab { modality, at } => world.grab(modality, at, out_events),
        Command::Drag { modality, to } => world.drag(modality, to, out_events),
        Command::Release { modality } => world.release(modality, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use pinch_puzzle_core::{GameState, TileId, TileSnapshot, TileView, Viewport};

    use super::{Grab, Grid, ImageInfo, TrackingStatus, World};

    /// Current lifecycle state of the session.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.state
    }

    /// Reports whether the solved image is still being previewed.
    #[must_use]
    pub fn is_previewing(world: &World) -> bool {
        world
            .session
            .as_ref()
            .map_or(false, |session| session.previewing)
    }

    /// Number of releases performed in the current session.
    #[must_use]
    pub fn moves(world: &World) -> u32 {
        world.session.as_ref().map_or(0, |session| session.moves)
    }

    /// Session time accumulated while playing.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world
            .session
            .as_ref()
            .map_or(Duration::ZERO, |session| session.elapsed)
    }

    /// Board geometry of the current session, if one was started.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.session.as_ref().map(|session| &session.grid)
    }

    /// Captures a read-only view of every tile in the session.
    #[must_use]
    pub fn tiles(world: &World) -> TileView {
        world
            .session
            .as_ref()
            .map(|session| session.tiles.view())
            .unwrap_or_default()
    }

    /// Captures a single tile's state.
    #[must_use]
    pub fn tile(world: &World, id: TileId) -> Option<TileSnapshot> {
        tiles(world).get(id).copied()
    }

    /// The tile currently held by an input modality, if any.
    #[must_use]
    pub fn active_grab(world: &World) -> Option<Grab> {
        world
            .session
            .as_ref()
            .and_then(|session| session.active_grab)
    }

    /// Availability of the camera input path.
    #[must_use]
    pub fn tracking_status(world: &World) -> &TrackingStatus {
        &world.tracking
    }

    /// Dimensions of the loaded image, if it is available.
    #[must_use]
    pub fn image(world: &World) -> Option<ImageInfo> {
        world.image
    }

    /// Viewport used for board layout.
    #[must_use]
    pub fn viewport(world: &World) -> Viewport {
        world.viewport
    }
}
