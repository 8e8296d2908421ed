//! TOML configuration for the game binary.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock game.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use pinch_puzzle_core::GridSize;
use pinch_puzzle_system_hand_tracking::{
    CameraSettings, Config as HandTrackingConfig, PinchThresholds, Smoothing, TrackerSettings,
};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) session: SessionConfig,
    pub(crate) tracking: TrackingConfig,
    pub(crate) tracker: TrackerConfig,
    pub(crate) camera: CameraConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) grid_size: u32,
    pub(crate) preview_seconds: f32,
    pub(crate) image: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            preview_seconds: 5.0,
            image: PathBuf::from("assets/puzzle.png"),
        }
    }
}

/// Cursor smoothing and pinch detection tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TrackingConfig {
    pub(crate) fast_smoothing: f32,
    pub(crate) slow_smoothing: f32,
    pub(crate) speed_threshold_px: f32,
    pub(crate) pinch_start: f32,
    pub(crate) pinch_release: f32,
    pub(crate) cursor_fade_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fast_smoothing: 0.35,
            slow_smoothing: 0.12,
            speed_threshold_px: 25.0,
            pinch_start: 0.035,
            pinch_release: 0.055,
            cursor_fade_ms: 150,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TrackerConfig {
    pub(crate) max_hands: u32,
    pub(crate) model_complexity: u32,
    pub(crate) min_detection_confidence: f32,
    pub(crate) min_tracking_confidence: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let settings = TrackerSettings::default();
        Self {
            max_hands: settings.max_hands,
            model_complexity: settings.model_complexity,
            min_detection_confidence: settings.min_detection_confidence,
            min_tracking_confidence: settings.min_tracking_confidence,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CameraConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let settings = CameraSettings::default();
        Self {
            width: settings.width,
            height: settings.height,
        }
    }
}

impl GameConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let tracking = &self.tracking;
        ensure!(
            tracking.pinch_start < tracking.pinch_release,
            "pinch_start ({}) must be below pinch_release ({})",
            tracking.pinch_start,
            tracking.pinch_release
        );
        for (name, value) in [
            ("fast_smoothing", tracking.fast_smoothing),
            ("slow_smoothing", tracking.slow_smoothing),
        ] {
            ensure!(
                value > 0.0 && value <= 1.0,
                "{name} must lie in (0, 1], got {value}"
            );
        }
        ensure!(
            self.session.preview_seconds.is_finite() && self.session.preview_seconds >= 0.0,
            "preview_seconds must be a non-negative number, got {}",
            self.session.preview_seconds
        );
        let _ = self.grid_size()?;
        Ok(())
    }

    pub(crate) fn grid_size(&self) -> Result<GridSize> {
        GridSize::new(self.session.grid_size).context("invalid session.grid_size")
    }

    pub(crate) fn preview_delay(&self) -> Duration {
        Duration::from_secs_f32(self.session.preview_seconds.max(0.0))
    }

    pub(crate) fn hand_tracking(&self) -> HandTrackingConfig {
        let tracking = &self.tracking;
        HandTrackingConfig::new(
            Smoothing::new(
                tracking.fast_smoothing,
                tracking.slow_smoothing,
                tracking.speed_threshold_px,
            ),
            PinchThresholds::new(tracking.pinch_start, tracking.pinch_release),
            Duration::from_millis(tracking.cursor_fade_ms),
        )
    }

    pub(crate) fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            max_hands: self.tracker.max_hands,
            model_complexity: self.tracker.model_complexity,
            min_detection_confidence: self.tracker.min_detection_confidence,
            min_tracking_confidence: self.tracker.min_tracking_confidence,
        }
    }

    pub(crate) fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            width: self.camera.width,
            height: self.camera.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::from_toml("").expect("empty config is valid");

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.grid_size().expect("valid size").get(), 3);
        assert_eq!(config.preview_delay(), Duration::from_secs(5));
        assert_eq!(config.tracker_settings(), TrackerSettings::default());
        assert_eq!(config.camera_settings(), CameraSettings::default());
        assert_eq!(config.hand_tracking(), HandTrackingConfig::default());
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = GameConfig::from_toml(
            r#"
                [session]
                grid_size = 5
                image = "art/cat.png"

                [tracking]
                pinch_start = 0.02

                [camera]
                width = 1280
            "#,
        )
        .expect("valid config");

        assert_eq!(config.session.grid_size, 5);
        assert_eq!(config.session.image, PathBuf::from("art/cat.png"));
        assert_eq!(config.session.preview_seconds, 5.0);
        assert_eq!(config.tracking.pinch_start, 0.02);
        assert_eq!(config.tracking.pinch_release, 0.055);
        assert_eq!(config.camera_settings().width, 1280);
        assert_eq!(config.camera_settings().height, 480);
    }

    #[test]
    fn inverted_pinch_thresholds_are_rejected() {
        let error = GameConfig::from_toml(
            r#"
                [tracking]
                pinch_start = 0.06
                pinch_release = 0.05
            "#,
        )
        .expect_err("thresholds without hysteresis must be rejected");

        assert!(error.to_string().contains("pinch_start"));
    }

    #[test]
    fn zero_grid_size_is_rejected() {
        assert!(GameConfig::from_toml("[session]\ngrid_size = 0\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GameConfig::from_toml("[session]\ngrdi_size = 4\n").is_err());
    }
}
