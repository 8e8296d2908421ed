//! Headless solver that plays a full game through the regular input systems.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use glam::Vec2;
use pinch_puzzle_core::{GameState, GridSize, Modality, Position, TileSnapshot};
use pinch_puzzle_rendering::{FrameInput, ImageStatus, PointerSample};
use pinch_puzzle_system_hand_tracking::{
    Config as HandTrackingConfig, HandFrame, HandLandmarks, NormalizedPoint,
};
use pinch_puzzle_world::query;
use tracing::{debug, info};

use crate::simulation::Simulation;

const FRAME: Duration = Duration::from_nanos(16_666_667);
const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);
const IMAGE_EDGE: u32 = 512;
const MAX_FRAMES: u64 = 200_000;
const POINTER_DRAG_FRAMES: u32 = 12;
const OPEN_SPREAD: f32 = 0.2;
const PINCH_SPREAD: f32 = 0.01;
const CURSOR_TOLERANCE: f32 = 0.5;
const CURSOR_SETTLE_FRAMES: u32 = 600;

/// Summary of a finished headless game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SolveReport {
    pub(crate) moves: u32,
    pub(crate) elapsed: Duration,
    pub(crate) frames: u64,
}

/// Solves a freshly scattered puzzle by dragging every tile into its cell.
pub(crate) fn solve(
    size: GridSize,
    seed: u64,
    modality: Modality,
    preview_delay: Duration,
    hand_config: HandTrackingConfig,
) -> Result<SolveReport> {
    let mut bot = Bot {
        simulation: Simulation::new(size, seed, preview_delay, hand_config, None),
        modality,
        frames: 0,
    };

    bot.frame(FrameInput {
        viewport: Some(VIEWPORT),
        image: Some(ImageStatus::Loaded {
            width: IMAGE_EDGE,
            height: IMAGE_EDGE,
        }),
        ..FrameInput::default()
    })?;
    while query::is_previewing(bot.simulation.world()) {
        bot.idle()?;
    }

    while query::game_state(bot.simulation.world()) == GameState::Playing {
        let tile = bot.next_tile().context("no loose tile left to move")?;
        bot.move_tile(tile)?;
    }

    let world = bot.simulation.world();
    let state = query::game_state(world);
    if state != GameState::Completed {
        bail!("solver stopped in state {state:?}");
    }
    let report = SolveReport {
        moves: query::moves(world),
        elapsed: query::elapsed(world),
        frames: bot.frames,
    };
    info!(
        moves = report.moves,
        frames = report.frames,
        ?modality,
        "puzzle solved"
    );
    Ok(report)
}

struct Bot {
    simulation: Simulation,
    modality: Modality,
    frames: u64,
}

impl Bot {
    fn frame(&mut self, input: FrameInput) -> Result<()> {
        self.step(input, None)
    }

    fn step(&mut self, input: FrameInput, hand: Option<HandLandmarks>) -> Result<()> {
        self.frames += 1;
        if self.frames > MAX_FRAMES {
            bail!("puzzle not solved within {MAX_FRAMES} frames");
        }
        let hand_frames = match self.modality {
            Modality::Pointer => None,
            Modality::Camera => Some(vec![match hand {
                Some(hand) => HandFrame::detected(hand, FRAME),
                None => HandFrame::missing(FRAME),
            }]),
        };
        self.simulation.step(FRAME, input, hand_frames);
        Ok(())
    }

    fn idle(&mut self) -> Result<()> {
        self.step(FrameInput::default(), None)
    }

    /// Highest unlocked tile, which is always the topmost one at its centre.
    fn next_tile(&self) -> Option<TileSnapshot> {
        query::tiles(self.simulation.world())
            .iter()
            .filter(|tile| !tile.locked)
            .max_by_key(|tile| tile.z)
            .copied()
    }

    fn move_tile(&mut self, tile: TileSnapshot) -> Result<()> {
        let grid = *query::grid(self.simulation.world()).context("no session running")?;
        let half = Position::new(grid.tile_length() * 0.5, grid.tile_length() * 0.5);
        let from = grid.to_viewport(tile.position) + half;
        let to = grid.to_viewport(grid.position_of(tile.correct)) + half;
        debug!(tile = tile.id.get(), "moving tile");

        match self.modality {
            Modality::Pointer => self.pointer_gesture(from, to),
            Modality::Camera => self.pinch_gesture(from, to),
        }
    }

    fn pointer_gesture(&mut self, from: Position, to: Position) -> Result<()> {
        self.pointer(PointerSample::Down(vec2(from)))?;
        for step in 1..POINTER_DRAG_FRAMES {
            let fraction = step as f32 / POINTER_DRAG_FRAMES as f32;
            self.pointer(PointerSample::Move(vec2(from.lerp(to, fraction))))?;
        }
        self.pointer(PointerSample::Up(vec2(to)))
    }

    fn pointer(&mut self, sample: PointerSample) -> Result<()> {
        self.frame(FrameInput {
            pointer: Some(sample),
            ..FrameInput::default()
        })
    }

    fn pinch_gesture(&mut self, from: Position, to: Position) -> Result<()> {
        self.settle_cursor(from, OPEN_SPREAD)?;
        self.step(FrameInput::default(), Some(hand_at(from, PINCH_SPREAD)))?;
        self.settle_cursor(to, PINCH_SPREAD)?;
        self.step(FrameInput::default(), Some(hand_at(to, OPEN_SPREAD)))
    }

    /// Holds the hand over `target` until the smoothed cursor catches up.
    fn settle_cursor(&mut self, target: Position, spread: f32) -> Result<()> {
        for _ in 0..CURSOR_SETTLE_FRAMES {
            self.step(FrameInput::default(), Some(hand_at(target, spread)))?;
            let settled = self
                .simulation
                .cursor()
                .is_some_and(|cursor| cursor.position.distance(target) < CURSOR_TOLERANCE);
            if settled {
                return Ok(());
            }
        }
        bail!("cursor never reached ({}, {})", target.x, target.y)
    }
}

/// Landmarks whose mirrored fingertip midpoint lands on `target`.
fn hand_at(target: Position, spread: f32) -> HandLandmarks {
    let x = 1.0 - target.x / VIEWPORT.x;
    let y = target.y / VIEWPORT.y;
    HandLandmarks::new(
        NormalizedPoint::new(x - spread * 0.5, y),
        NormalizedPoint::new(x + spread * 0.5, y),
    )
}

fn vec2(position: Position) -> Vec2 {
    Vec2::new(position.x, position.y)
}
