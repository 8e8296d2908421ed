//! Recorded hand-tracking sessions replayed in place of a live tracker.
//!
//! A trace is a JSON-lines file; each line is one tracker frame:
//!
//! ```text
//! {"dt_ms": 33, "landmarks": [[0.41, 0.52], [0.43, 0.50], ...]}
//! {"dt_ms": 33, "landmarks": null}
//! ```

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use pinch_puzzle_system_hand_tracking::{HandFrame, HandLandmarks, NormalizedPoint};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TraceRecord {
    dt_ms: u64,
    landmarks: Option<Vec<[f32; 2]>>,
}

impl TraceRecord {
    fn into_frame(self) -> Result<HandFrame> {
        let dt = Duration::from_millis(self.dt_ms);
        let Some(landmarks) = self.landmarks else {
            return Ok(HandFrame::missing(dt));
        };
        let points: Vec<NormalizedPoint> = landmarks
            .into_iter()
            .map(|[x, y]| NormalizedPoint::new(x, y))
            .collect();
        let hand = HandLandmarks::from_points(&points)?;
        Ok(HandFrame::detected(hand, dt))
    }
}

/// Frames of a recorded trace, released as playback time reaches them.
#[derive(Clone, Debug)]
pub(crate) struct HandTrace {
    frames: Vec<HandFrame>,
    next: usize,
    clock: Duration,
    due_at: Duration,
}

impl HandTrace {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read hand trace {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid hand trace {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut frames = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(line)
                .with_context(|| format!("line {} is not a trace record", index + 1))?;
            let frame = record
                .into_frame()
                .with_context(|| format!("line {} has an unusable hand", index + 1))?;
            frames.push(frame);
        }

        let due_at = frames.first().map_or(Duration::ZERO, |frame| frame.dt);
        Ok(Self {
            frames,
            next: 0,
            clock: Duration::ZERO,
            due_at,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    /// Advances playback by `dt` and returns every frame that became due.
    pub(crate) fn due(&mut self, dt: Duration) -> Vec<HandFrame> {
        self.clock = self.clock.saturating_add(dt);
        let mut due = Vec::new();
        while let Some(frame) = self.frames.get(self.next) {
            if self.due_at > self.clock {
                break;
            }
            due.push(*frame);
            self.next += 1;
            if let Some(upcoming) = self.frames.get(self.next) {
                self.due_at = self.due_at.saturating_add(upcoming.dt);
            }
        }
        due
    }
}
