#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Pinch Puzzle adapters.
//!
//! A [`Scene`] is a pure projection of the session: backends draw it and
//! report what the player did through [`FrameInput`], but never decide game
//! outcomes themselves.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use pinch_puzzle_core::{
    CellIndex, GameState, GridSize, TileId, COMPLETION_BANNER, SELECTABLE_GRID_SIZES,
};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let lift = |channel: f32| channel + (1.0 - channel) * amount;

        Self {
            red: lift(self.red),
            green: lift(self.green),
            blue: lift(self.blue),
            alpha: self.alpha,
        }
    }
}

/// Pointer gesture observed by a backend during a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerSample {
    /// The pointer was pressed at the provided screen position.
    Down(Vec2),
    /// The pointer moved while pressed.
    Move(Vec2),
    /// The pointer was lifted at the provided screen position.
    Up(Vec2),
}

/// Outcome of loading the puzzle image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    /// The image decoded successfully.
    Loaded {
        /// Width of the image in pixels.
        width: u32,
        /// Height of the image in pixels.
        height: u32,
    },
    /// The image could not be loaded.
    Failed {
        /// Human readable description of the failure.
        reason: String,
    },
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Drawable size, reported when it changed since the previous frame.
    pub viewport: Option<Vec2>,
    /// Result of the image load, reported once.
    pub image: Option<ImageStatus>,
    /// Pointer gesture observed on this frame.
    pub pointer: Option<PointerSample>,
    /// Whether the player asked for a fresh game with the current size.
    pub reset: bool,
    /// Whether the player pressed the pause button.
    pub toggle_pause: bool,
    /// Grid size picked from the size selector on this frame.
    pub size_selected: Option<GridSize>,
}

/// Source region of the puzzle image, in normalised texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    /// Left edge in `0.0..=1.0`.
    pub x: f32,
    /// Top edge in `0.0..=1.0`.
    pub y: f32,
    /// Width as a fraction of the image.
    pub width: f32,
    /// Height as a fraction of the image.
    pub height: f32,
}

impl SourceRect {
    /// Region of the image shown by the tile that belongs in `cell`.
    ///
    /// The image is stretched over the whole board, so every cell shows an
    /// equal `1/N` slice along each axis.
    #[must_use]
    pub fn for_cell(cell: CellIndex, size: GridSize) -> Self {
        let edge = size.get();
        let fraction = 1.0 / edge as f32;
        Self {
            x: (cell.get() % edge) as f32 * fraction,
            y: (cell.get() / edge) as f32 * fraction,
            width: fraction,
            height: fraction,
        }
    }
}

/// Board outline drawn beneath the tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardPresentation {
    /// Top-left corner of the board in screen coordinates.
    pub origin: Vec2,
    /// Edge length of the square board.
    pub size: f32,
    /// Number of tiles along each edge.
    pub grid_size: GridSize,
    /// Color of the board outline.
    pub line_color: Color,
}

/// Single tile ready to be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Identifier of the tile.
    pub id: TileId,
    /// Top-left corner in screen coordinates.
    pub top_left: Vec2,
    /// Edge length of the tile.
    pub size: f32,
    /// Image region shown on the tile.
    pub source: SourceRect,
    /// Whether the tile is locked into place.
    pub locked: bool,
    /// Whether an input modality currently holds the tile.
    pub held: bool,
}

/// Hand-tracked cursor overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorPresentation {
    /// Cursor position in screen coordinates.
    pub position: Vec2,
    /// Whether the hand is pinching.
    pub pinching: bool,
}

/// Heads-up display contents.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Session time accumulated while playing.
    pub elapsed: Duration,
    /// Number of moves performed.
    pub moves: u32,
    /// Lifecycle state of the session.
    pub state: GameState,
    /// Grid size of the running or last started session.
    pub grid_size: GridSize,
    /// Description of the failure that stopped the game, if any.
    pub failure: Option<String>,
    /// Notice shown when camera input is unavailable.
    pub tracking_notice: Option<String>,
}

impl HudPresentation {
    /// Creates an idle HUD for the provided grid size.
    #[must_use]
    pub const fn new(grid_size: GridSize) -> Self {
        Self {
            elapsed: Duration::ZERO,
            moves: 0,
            state: GameState::Idle,
            grid_size,
            failure: None,
            tracking_notice: None,
        }
    }

    /// Elapsed time formatted with one decimal, e.g. `12.3`.
    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format!("{:.1}", self.elapsed.as_secs_f32())
    }

    /// Caption of the pause button.
    #[must_use]
    pub fn pause_label(&self) -> &'static str {
        if self.state == GameState::Paused {
            "Resume"
        } else {
            "Pause"
        }
    }

    /// Banner drawn across the board, if the state calls for one.
    #[must_use]
    pub fn banner(&self) -> Option<String> {
        match self.state {
            GameState::Completed => Some(COMPLETION_BANNER.to_owned()),
            GameState::Failed(_) => Some(match &self.failure {
                Some(reason) => format!("Image failed to load: {reason}"),
                None => "Image failed to load".to_owned(),
            }),
            GameState::Idle | GameState::Playing | GameState::Paused => None,
        }
    }

    /// Sizes offered by the selector, flagged when currently active.
    #[must_use]
    pub fn size_options(&self) -> [(GridSize, bool); 3] {
        SELECTABLE_GRID_SIZES.map(|size| (size, size == self.grid_size))
    }
}

/// Scene description combining the board, its tiles and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board outline, absent until a game starts.
    pub board: Option<BoardPresentation>,
    /// Tiles in back-to-front draw order.
    pub tiles: Vec<TilePresentation>,
    /// Hand-tracked cursor, if one is visible.
    pub cursor: Option<CursorPresentation>,
    /// Heads-up display contents.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates an empty scene for the provided grid size.
    #[must_use]
    pub const fn new(grid_size: GridSize) -> Self {
        Self {
            board: None,
            tiles: Vec::new(),
            cursor: None,
            hud: HudPresentation::new(grid_size),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Pinch Puzzle scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
