#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system turning hand-tracking frames into a pinch-driven cursor.
//!
//! Landmarks arrive normalised to `0.0..=1.0` in camera space. The system
//! mirrors them so the cursor follows the player like a reflection, smooths
//! the cursor and treats a thumb/index pinch as the grab gesture.

use std::time::Duration;

use pinch_puzzle_core::{
    Command, Deferred, Event, InputAdapter, Modality, Position, PuzzleError, Resource, Viewport,
    DEFAULT_VIEWPORT,
};
use tracing::debug;

/// Number of landmarks reported for a tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark index of the thumb tip.
pub const THUMB_TIP: usize = 4;

/// Landmark index of the index finger tip.
pub const INDEX_TIP: usize = 8;

/// Landmark position normalised to the camera frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedPoint {
    /// Horizontal component in `0.0..=1.0`, as seen by the camera.
    pub x: f32,
    /// Vertical component in `0.0..=1.0`, growing downwards.
    pub y: f32,
}

impl NormalizedPoint {
    /// Creates a new normalised point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Fingertips of a detected hand, the only landmarks the cursor needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandLandmarks {
    thumb_tip: NormalizedPoint,
    index_tip: NormalizedPoint,
}

impl HandLandmarks {
    /// Creates landmarks from explicit fingertip positions.
    #[must_use]
    pub const fn new(thumb_tip: NormalizedPoint, index_tip: NormalizedPoint) -> Self {
        Self {
            thumb_tip,
            index_tip,
        }
    }

    /// Extracts the fingertips from a full landmark set.
    pub fn from_points(points: &[NormalizedPoint]) -> Result<Self, PuzzleError> {
        if points.len() < LANDMARK_COUNT {
            return Err(PuzzleError::IncompleteLandmarks {
                len: points.len(),
                expected: LANDMARK_COUNT,
            });
        }
        Ok(Self::new(points[THUMB_TIP], points[INDEX_TIP]))
    }

    /// Thumb tip position.
    #[must_use]
    pub const fn thumb_tip(&self) -> NormalizedPoint {
        self.thumb_tip
    }

    /// Index finger tip position.
    #[must_use]
    pub const fn index_tip(&self) -> NormalizedPoint {
        self.index_tip
    }

    /// Normalised distance between the two fingertips.
    #[must_use]
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip.distance(self.index_tip)
    }
}

/// Tracker output for a single camera frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFrame {
    /// Detected hand, or `None` when no hand is visible.
    pub hand: Option<HandLandmarks>,
    /// Time elapsed since the previous frame.
    pub dt: Duration,
}

impl HandFrame {
    /// Frame reporting a detected hand.
    #[must_use]
    pub const fn detected(hand: HandLandmarks, dt: Duration) -> Self {
        Self {
            hand: Some(hand),
            dt,
        }
    }

    /// Frame reporting that no hand is visible.
    #[must_use]
    pub const fn missing(dt: Duration) -> Self {
        Self { hand: None, dt }
    }
}

/// Settings handed to the hand-tracking model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerSettings {
    /// Maximum number of hands the model reports.
    pub max_hands: u32,
    /// Model complexity level.
    pub model_complexity: u32,
    /// Minimum confidence for a new detection.
    pub min_detection_confidence: f32,
    /// Minimum confidence to keep tracking a detected hand.
    pub min_tracking_confidence: f32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            max_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
        }
    }
}

/// Capture resolution requested from the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraSettings {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Exponential smoothing applied to the cursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothing {
    fast: f32,
    slow: f32,
    speed_threshold: f32,
}

impl Smoothing {
    /// Creates smoothing parameters.
    ///
    /// `fast` applies when the cursor target moved more than
    /// `speed_threshold` pixels since the last smoothed position, `slow`
    /// otherwise.
    #[must_use]
    pub const fn new(fast: f32, slow: f32, speed_threshold: f32) -> Self {
        Self {
            fast,
            slow,
            speed_threshold,
        }
    }

    fn step(&self, previous: Position, target: Position) -> Position {
        let factor = if target.distance(previous) > self.speed_threshold {
            self.fast
        } else {
            self.slow
        };
        previous.lerp(target, factor)
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Self::new(0.35, 0.12, 25.0)
    }
}

/// Pinch thresholds with hysteresis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchThresholds {
    start: f32,
    release: f32,
}

impl PinchThresholds {
    /// Creates thresholds; a pinch starts below `start` and ends above `release`.
    #[must_use]
    pub const fn new(start: f32, release: f32) -> Self {
        Self { start, release }
    }
}

impl Default for PinchThresholds {
    fn default() -> Self {
        Self::new(0.035, 0.055)
    }
}

/// Configuration parameters required to construct the hand-tracking system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    smoothing: Smoothing,
    pinch: PinchThresholds,
    cursor_fade: Duration,
}

impl Config {
    /// Creates a new configuration from its parts.
    #[must_use]
    pub const fn new(smoothing: Smoothing, pinch: PinchThresholds, cursor_fade: Duration) -> Self {
        Self {
            smoothing,
            pinch,
            cursor_fade,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Smoothing::default(),
            PinchThresholds::default(),
            Duration::from_millis(150),
        )
    }
}

/// Cursor drawn over the board while a hand is tracked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorIndicator {
    /// Smoothed cursor position in viewport coordinates.
    pub position: Position,
    /// Whether the hand is currently pinching.
    pub pinching: bool,
}

/// Camera-cursor input system.
#[derive(Clone, Debug)]
pub struct HandTracking {
    config: Config,
    viewport: Viewport,
    available: bool,
    cursor: Option<Position>,
    visible: bool,
    pinching: bool,
    fade: Deferred,
}

impl HandTracking {
    /// Creates a new hand-tracking system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            viewport: DEFAULT_VIEWPORT,
            available: true,
            cursor: None,
            visible: false,
            pinching: false,
            fade: Deferred::idle(),
        }
    }

    /// Cursor to draw this frame, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<CursorIndicator> {
        if !self.visible {
            return None;
        }
        self.cursor.map(|position| CursorIndicator {
            position,
            pinching: self.pinching,
        })
    }

    /// Reports whether the hand is currently pinching.
    #[must_use]
    pub const fn is_pinching(&self) -> bool {
        self.pinching
    }

    /// Reports whether camera input is still accepted.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::ViewportConfigured { viewport } => self.viewport = *viewport,
                Event::GameStarted { .. } => self.fade.cancel(),
                Event::ResourceFailed {
                    resource: Resource::Camera | Resource::HandTracker,
                    ..
                } => {
                    self.available = false;
                    self.pinching = false;
                    self.visible = false;
                    self.cursor = None;
                    self.fade.cancel();
                }
                _ => {}
            }
        }
    }

    /// Maps a normalised point to mirrored viewport pixels.
    fn to_viewport(&self, point: NormalizedPoint) -> Position {
        Position::new(
            (1.0 - point.x) * self.viewport.width(),
            point.y * self.viewport.height(),
        )
    }

    fn track(&mut self, hand: HandLandmarks) -> Position {
        let thumb = self.to_viewport(hand.thumb_tip);
        let index = self.to_viewport(hand.index_tip);
        let target = thumb.lerp(index, 0.5);
        let smoothed = match self.cursor {
            Some(previous) => self.config.smoothing.step(previous, target),
            None => target,
        };
        self.cursor = Some(smoothed);
        self.visible = true;
        self.fade.cancel();
        smoothed
    }
}

impl Default for HandTracking {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl InputAdapter for HandTracking {
    type Input = HandFrame;

    fn modality(&self) -> Modality {
        Modality::Camera
    }

    fn handle(&mut self, events: &[Event], input: Self::Input, out: &mut Vec<Command>) {
        self.observe(events);
        if !self.available {
            return;
        }
        let modality = self.modality();

        if self.fade.advance(input.dt) {
            self.visible = false;
            self.cursor = None;
        }

        let Some(hand) = input.hand else {
            if self.pinching {
                self.pinching = false;
                debug!("hand lost while pinching");
                out.push(Command::Release { modality });
            }
            if self.visible && !self.fade.is_armed() {
                self.fade.arm(self.config.cursor_fade);
            }
            return;
        };

        let cursor = self.track(hand);
        let distance = hand.pinch_distance();
        let thresholds = self.config.pinch;
        if !self.pinching && distance < thresholds.start {
            self.pinching = true;
            debug!(distance, x = cursor.x, y = cursor.y, "pinch started");
            out.push(Command::Grab { modality, at: cursor });
        } else if self.pinching && distance > thresholds.release {
            self.pinching = false;
            debug!(distance, "pinch released");
            out.push(Command::Release { modality });
        } else if self.pinching {
            out.push(Command::Drag {
                modality,
                to: cursor,
            });
        }
    }
}
