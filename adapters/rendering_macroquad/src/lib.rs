#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Pinch Puzzle.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the control
//! panel. All UI-specific calls live inside the local `ui` module to avoid
//! leaking Macroquad UI types throughout the renderer.

mod ui;

use std::{collections::VecDeque, path::PathBuf, time::Duration};

use anyhow::Result;
use glam::Vec2;
use macroquad::{
    color::WHITE,
    input::{
        is_key_pressed, is_mouse_button_down, is_mouse_button_pressed, is_mouse_button_released,
        mouse_position, KeyCode, MouseButton,
    },
    math::{vec2, Rect},
    texture::{DrawTextureParams, FilterMode, Texture2D},
};
use pinch_puzzle_core::{GridSize, SELECTABLE_GRID_SIZES};
use pinch_puzzle_rendering::{
    Color, FrameInput, ImageStatus, PointerSample, Presentation, RenderingBackend, Scene,
    SourceRect, TilePresentation,
};
use tracing::{info, warn};

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};

/// Width of the control panel docked to the left edge of the window.
const PANEL_WIDTH: f32 = 200.0;
const BANNER_FONT_SIZE: f32 = 48.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    reset_latched: bool,
    pause_latched: bool,
    size_latched: Option<GridSize>,
}

impl ControlPanelInputState {
    /// Returns whether a reset was requested and clears the latch.
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset_latched)
    }

    /// Records that the reset button was pressed this frame.
    pub fn register_reset(&mut self) {
        self.reset_latched = true;
    }

    /// Returns whether a pause toggle was requested and clears the latch.
    pub fn take_toggle_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_latched)
    }

    /// Records that the pause button was pressed this frame.
    pub fn register_toggle_pause(&mut self) {
        self.pause_latched = true;
    }

    /// Returns the latched size selection, clearing it so it fires once.
    pub fn take_size(&mut self) -> Option<GridSize> {
        self.size_latched.take()
    }

    /// Records a size selection; the latest selection in a frame wins.
    pub fn register_size(&mut self, size: GridSize) {
        self.size_latched = Some(size);
    }

    fn register(&mut self, result: ControlPanelUiResult) {
        if result.reset {
            self.register_reset();
        }
        if result.toggle_pause {
            self.register_toggle_pause();
        }
        if let Some(size) = result.size_selected {
            self.register_size(size);
        }
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `Space` or `P` toggles pause.
    toggle_pause: bool,
    /// `R` restarts with the current size.
    reset: bool,
    /// `3`, `4` or `5` pick a grid size.
    size: Option<GridSize>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let size_keys = [KeyCode::Key3, KeyCode::Key4, KeyCode::Key5];
        let size = size_keys
            .iter()
            .zip(SELECTABLE_GRID_SIZES)
            .find(|(key, _)| is_key_pressed(**key))
            .map(|(_, size)| size);

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            toggle_pause: is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::P),
            reset: is_key_pressed(KeyCode::R),
            size,
        }
    }
}

/// Mouse state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct MouseObservation {
    position: Vec2,
    pressed: bool,
    released: bool,
    down: bool,
}

impl MouseObservation {
    fn poll() -> Self {
        let (x, y) = mouse_position();
        Self {
            position: Vec2::new(x, y),
            pressed: is_mouse_button_pressed(MouseButton::Left),
            released: is_mouse_button_released(MouseButton::Left),
            down: is_mouse_button_down(MouseButton::Left),
        }
    }
}

/// Turns raw mouse state into pointer gestures, one per frame.
///
/// Presses that land on the control panel belong to its buttons and never
/// reach the board. A click whose press and release fall in the same frame
/// reports `Down` now and `Up` on the next frame.
#[derive(Clone, Debug, Default)]
struct PointerTracker {
    previous_position: Option<Vec2>,
    queued: VecDeque<PointerSample>,
}

impl PointerTracker {
    fn sample(
        &mut self,
        observation: MouseObservation,
        panel_width: f32,
    ) -> Option<PointerSample> {
        let position = observation.position;
        let previous = self.previous_position.replace(position);

        if observation.pressed && position.x >= panel_width {
            self.queued.push_back(PointerSample::Down(position));
        }
        if observation.released {
            self.queued.push_back(PointerSample::Up(position));
        } else if observation.down
            && !observation.pressed
            && previous != Some(position)
            && self.queued.is_empty()
        {
            self.queued.push_back(PointerSample::Move(position));
        }
        self.queued.pop_front()
    }
}

/// Reports the window size when it differs from the last reported one.
fn viewport_change(current: Vec2, reported: Option<Vec2>) -> Option<Vec2> {
    if current.x <= 0.0 || current.y <= 0.0 || reported == Some(current) {
        return None;
    }
    Some(current)
}

/// Converts a normalised source region into texture pixels.
fn source_pixels(source: SourceRect, texture_width: f32, texture_height: f32) -> Rect {
    Rect::new(
        source.x * texture_width,
        source.y * texture_height,
        source.width * texture_width,
        source.height * texture_height,
    )
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    image_path: Option<PathBuf>,
    window_size: (i32, i32),
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            image_path: None,
            window_size: (1280, 720),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to synchronise presentation with the display refresh rate.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = Some(i32::from(enabled));
        self
    }

    /// Sets the puzzle image loaded when the window opens.
    #[must_use]
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Sets the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width, height);
        self
    }
}

async fn load_puzzle_image(path: Option<PathBuf>) -> (Option<Texture2D>, ImageStatus) {
    let Some(path) = path else {
        return (
            None,
            ImageStatus::Failed {
                reason: "no puzzle image configured".to_owned(),
            },
        );
    };
    let path_display = path.display().to_string();
    match macroquad::texture::load_texture(&path.to_string_lossy()).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Linear);
            let width = texture.width() as u32;
            let height = texture.height() as u32;
            info!(path = %path_display, width, height, "puzzle image loaded");
            (Some(texture), ImageStatus::Loaded { width, height })
        }
        Err(error) => {
            warn!(path = %path_display, %error, "puzzle image failed to load");
            (
                None,
                ImageStatus::Failed {
                    reason: format!("{path_display}: {error}"),
                },
            )
        }
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            image_path,
            window_size: (window_width, window_height),
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let (texture, image_status) = load_puzzle_image(image_path).await;
            let mut pending_image = Some(image_status);
            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(clear_color.lighten(0.12));
            let mut control_panel_input = ControlPanelInputState::default();
            let mut reported_viewport = None;
            let mut pointer_tracker = PointerTracker::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);
                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let viewport = viewport_change(screen, reported_viewport);
                if viewport.is_some() {
                    reported_viewport = viewport;
                }

                let mouse = MouseObservation::poll();
                let pointer = pointer_tracker.sample(mouse, PANEL_WIDTH);

                let frame_input = FrameInput {
                    viewport,
                    image: pending_image.take(),
                    pointer,
                    reset: control_panel_input.take_reset() || keyboard.reset,
                    toggle_pause: control_panel_input.take_toggle_pause()
                        || keyboard.toggle_pause,
                    size_selected: control_panel_input.take_size().or(keyboard.size),
                };

                let dt_seconds = macroquad::time::get_frame_time();
                update_scene(
                    Duration::from_secs_f32(dt_seconds.max(0.0)),
                    frame_input,
                    &mut scene,
                );

                draw_board(&scene);
                for tile in &scene.tiles {
                    draw_tile(tile, texture);
                }
                draw_cursor(&scene);
                draw_banner(&scene, screen);

                let mut root_ui = macroquad::ui::root_ui();
                let result = draw_control_panel_ui(
                    &mut root_ui,
                    ControlPanelUiContext {
                        origin: vec2(0.0, 0.0),
                        size: vec2(PANEL_WIDTH, screen.y),
                        background: panel_background,
                        hud: &scene.hud,
                    },
                );
                control_panel_input.register(result);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_board(scene: &Scene) {
    let Some(board) = scene.board else {
        return;
    };
    let line = to_macroquad_color(board.line_color);
    let faint = to_macroquad_color(board.line_color.lighten(0.5));
    let tile = board.size / board.grid_size.get() as f32;

    for step in 1..board.grid_size.get() {
        let offset = step as f32 * tile;
        macroquad::shapes::draw_line(
            board.origin.x + offset,
            board.origin.y,
            board.origin.x + offset,
            board.origin.y + board.size,
            1.0,
            faint,
        );
        macroquad::shapes::draw_line(
            board.origin.x,
            board.origin.y + offset,
            board.origin.x + board.size,
            board.origin.y + offset,
            1.0,
            faint,
        );
    }
    macroquad::shapes::draw_rectangle_lines(
        board.origin.x,
        board.origin.y,
        board.size,
        board.size,
        2.0,
        line,
    );
}

fn draw_tile(tile: &TilePresentation, texture: Option<Texture2D>) {
    let TilePresentation {
        top_left,
        size,
        source,
        locked,
        held,
        ..
    } = *tile;

    match texture {
        Some(texture) => macroquad::texture::draw_texture_ex(
            texture,
            top_left.x,
            top_left.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(size, size)),
                source: Some(source_pixels(source, texture.width(), texture.height())),
                ..DrawTextureParams::default()
            },
        ),
        None => macroquad::shapes::draw_rectangle(
            top_left.x,
            top_left.y,
            size,
            size,
            to_macroquad_color(Color::from_rgb_u8(120, 120, 120)),
        ),
    }

    if held {
        macroquad::shapes::draw_rectangle_lines(
            top_left.x,
            top_left.y,
            size,
            size,
            4.0,
            to_macroquad_color(Color::from_rgb_u8(255, 214, 102)),
        );
    } else if !locked {
        macroquad::shapes::draw_rectangle_lines(
            top_left.x,
            top_left.y,
            size,
            size,
            1.0,
            to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.6)),
        );
    }
}

fn draw_cursor(scene: &Scene) {
    let Some(cursor) = scene.cursor else {
        return;
    };
    let color = to_macroquad_color(Color::from_rgb_u8(80, 200, 255));
    if cursor.pinching {
        macroquad::shapes::draw_circle(cursor.position.x, cursor.position.y, 10.0, color);
    } else {
        macroquad::shapes::draw_circle_lines(cursor.position.x, cursor.position.y, 14.0, 3.0, color);
    }
}

fn draw_banner(scene: &Scene, screen: Vec2) {
    let Some(text) = scene.hud.banner() else {
        return;
    };
    let dimensions = macroquad::text::measure_text(&text, None, BANNER_FONT_SIZE as u16, 1.0);
    let x = (screen.x - dimensions.width) * 0.5;
    let y = screen.y * 0.5;
    macroquad::shapes::draw_rectangle(
        x - 24.0,
        y - dimensions.height - 16.0,
        dimensions.width + 48.0,
        dimensions.height + 40.0,
        to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.75)),
    );
    macroquad::text::draw_text(&text, x, y, BANNER_FONT_SIZE, WHITE);
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
