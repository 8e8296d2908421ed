//! Frame driver that wires adapters, input systems and the world together.

use std::{mem, time::Duration};

use glam::Vec2;
use pinch_puzzle_core::{
    Command, Event, GameState, GridSize, InputAdapter, Position, Resource, Viewport,
};
use pinch_puzzle_rendering::{
    BoardPresentation, Color, CursorPresentation, FrameInput, ImageStatus, PointerSample, Scene,
    SourceRect, TilePresentation,
};
use pinch_puzzle_system_hand_tracking::{
    Config as HandTrackingConfig, CursorIndicator, HandFrame, HandTracking,
};
use pinch_puzzle_system_pointer_input::{PointerEvent, PointerInput};
use pinch_puzzle_world::{self as world, query, TrackingStatus, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::hand_trace::HandTrace;

const BOARD_LINE_COLOR: Color = Color::from_rgb_u8(90, 90, 100);

/// Camera silence after which the hand counts as no longer detected.
/// Must exceed the frame gap of the slowest supported tracker.
const CAMERA_STALL: Duration = Duration::from_millis(100);

/// Owns the world and the input systems for an interactive session.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    pointer: PointerInput,
    hand: HandTracking,
    trace: Option<HandTrace>,
    hand_backlog: Vec<Event>,
    camera_silence: Duration,
    pending_events: Vec<Event>,
    size: GridSize,
    seeds: ChaCha8Rng,
    image_failure: Option<String>,
}

impl Simulation {
    pub(crate) fn new(
        size: GridSize,
        seed: u64,
        preview_delay: Duration,
        hand_config: HandTrackingConfig,
        trace: Option<HandTrace>,
    ) -> Self {
        let mut world = World::new();
        let mut pending_events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigurePreview {
                delay: preview_delay,
            },
            &mut pending_events,
        );

        Self {
            world,
            pointer: PointerInput::new(),
            hand: HandTracking::new(hand_config),
            trace,
            hand_backlog: Vec::new(),
            camera_silence: Duration::ZERO,
            pending_events,
            size,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            image_failure: None,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn cursor(&self) -> Option<CursorIndicator> {
        self.hand.cursor()
    }

    /// Advances one interactive frame, pulling camera frames from the trace.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput) {
        let hand_frames = self.trace.as_mut().map(|trace| trace.due(dt));
        self.step(dt, input, hand_frames);
    }

    /// Advances one frame with explicit camera frames.
    ///
    /// `None` means no camera is connected; `Some` with an empty list means
    /// the camera produced nothing this frame. Once the camera stays silent
    /// for `CAMERA_STALL`, every silent frame counts as a frame without a
    /// hand.
    pub(crate) fn step(
        &mut self,
        dt: Duration,
        input: FrameInput,
        hand_frames: Option<Vec<HandFrame>>,
    ) {
        let events = mem::take(&mut self.pending_events);
        let mut commands = Vec::new();
        self.collect_adapter_commands(&input, &mut commands);

        let pointer = input.pointer.map(|sample| match sample {
            PointerSample::Down(at) => PointerEvent::Down { at: position(at) },
            PointerSample::Move(at) => PointerEvent::Move { at: position(at) },
            PointerSample::Up(at) => PointerEvent::Up { at: position(at) },
        });
        self.pointer.handle(&events, pointer, &mut commands);

        if let Some(mut frames) = hand_frames {
            self.hand_backlog.extend(events.iter().cloned());
            if frames.is_empty() {
                self.camera_silence = self.camera_silence.saturating_add(dt);
                if self.camera_silence >= CAMERA_STALL {
                    frames.push(HandFrame::missing(dt));
                }
            } else {
                self.camera_silence = Duration::ZERO;
            }
            for frame in frames {
                let backlog = mem::take(&mut self.hand_backlog);
                self.hand.handle(&backlog, frame, &mut commands);
            }
        }

        commands.push(Command::Tick { dt });
        for command in commands {
            world::apply(&mut self.world, command, &mut self.pending_events);
        }
    }

    fn collect_adapter_commands(&mut self, input: &FrameInput, out: &mut Vec<Command>) {
        if let Some(size) = input.viewport {
            match Viewport::new(size.x, size.y) {
                Ok(viewport) => out.push(Command::ConfigureViewport { viewport }),
                Err(error) => warn!(%error, "ignoring viewport report"),
            }
        }

        match &input.image {
            Some(ImageStatus::Loaded { width, height }) => {
                self.image_failure = None;
                out.push(Command::ImageLoaded {
                    width: *width,
                    height: *height,
                });
                out.push(self.start_command());
            }
            Some(ImageStatus::Failed { reason }) => {
                self.image_failure = Some(reason.clone());
                out.push(Command::ReportResourceFailure {
                    resource: Resource::Image,
                    reason: reason.clone(),
                });
            }
            None => {}
        }

        if let Some(size) = input.size_selected {
            info!(size = size.get(), "grid size selected");
            self.size = size;
            out.push(self.start_command());
        } else if input.reset {
            out.push(self.start_command());
        }

        if input.toggle_pause {
            let paused = query::game_state(&self.world) != GameState::Paused;
            out.push(Command::SetPaused { paused });
        }
    }

    fn start_command(&mut self) -> Command {
        Command::StartGame {
            size: self.size,
            seed: self.seeds.gen(),
        }
    }

    /// Projects the current world state into the scene.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let world = &self.world;
        let hud = &mut scene.hud;
        hud.elapsed = query::elapsed(world);
        hud.moves = query::moves(world);
        hud.state = query::game_state(world);
        hud.grid_size = query::grid(world).map_or(self.size, |grid| grid.size());
        hud.failure = self.image_failure.clone();
        hud.tracking_notice = match query::tracking_status(world) {
            TrackingStatus::Available => None,
            TrackingStatus::Unavailable { resource, reason } => Some(format!(
                "{} unavailable ({reason}); pointer input only",
                match resource {
                    Resource::Camera => "Camera",
                    Resource::HandTracker | Resource::Image => "Hand tracking",
                }
            )),
        };

        scene.board = query::grid(world).map(|grid| {
            let origin = grid.origin();
            BoardPresentation {
                origin: Vec2::new(origin.x, origin.y),
                size: grid.board_size(),
                grid_size: grid.size(),
                line_color: BOARD_LINE_COLOR,
            }
        });

        scene.tiles.clear();
        if let Some(grid) = query::grid(world) {
            let held = query::active_grab(world).map(|grab| grab.tile());
            let mut tiles = query::tiles(world).into_vec();
            tiles.sort_by_key(|tile| (tile.z, tile.id));
            scene.tiles.extend(tiles.into_iter().map(|tile| {
                let top_left = grid.to_viewport(tile.position);
                TilePresentation {
                    id: tile.id,
                    top_left: Vec2::new(top_left.x, top_left.y),
                    size: grid.tile_length(),
                    source: SourceRect::for_cell(tile.correct, grid.size()),
                    locked: tile.locked,
                    held: held == Some(tile.id),
                }
            }));
        }

        scene.cursor = self.hand.cursor().map(|cursor| CursorPresentation {
            position: Vec2::new(cursor.position.x, cursor.position.y),
            pinching: cursor.pinching,
        });
    }
}

fn position(at: Vec2) -> Position {
    Position::new(at.x, at.y)
}
