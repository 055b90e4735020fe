//! Recorded controller motion, replayed through the same sampler a live
//! session uses.
//!
//! Recordings are JSON lines, one frame per line:
//!
//! ```text
//! {"t_ms": 0, "left": [-0.2, 1.1, -0.3], "right": [0.2, 0.9, -0.3]}
//! {"t_ms": 16.7, "left": [-0.2, 1.0, -0.3]}
//! ```
//!
//! A missing hand means "untracked this frame"; `"reset": true` marks a frame
//! where the count was reset. Blank lines and lines starting with `#` are
//! skipped.

use foundation::{Time, Vec3};
use serde::{Deserialize, Serialize};

use crate::pose::{
    Handedness, InputSource, ReferenceSpace, SpaceId, TargetRayMode, XrFrame, XrSession,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    pub t_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<[f64; 3]>,
    /// User pressed reset before this frame.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset: bool,
}

impl RecordedSample {
    pub fn time(&self) -> Time {
        Time::from_millis(self.t_ms)
    }
}

#[derive(Debug)]
pub struct RecordingError {
    /// 1-based line number.
    pub line: usize,
    pub source: serde_json::Error,
}

impl std::fmt::Display for RecordingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "recording line {}: {}", self.line, self.source)
    }
}

impl std::error::Error for RecordingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn parse_recording(text: &str) -> Result<Vec<RecordedSample>, RecordingError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('#')
        })
        .map(|(i, l)| {
            serde_json::from_str(l).map_err(|source| RecordingError { line: i + 1, source })
        })
        .collect()
}

const LEFT_GRIP: SpaceId = SpaceId(1);
const LEFT_RAY: SpaceId = SpaceId(2);
const RIGHT_GRIP: SpaceId = SpaceId(3);
const RIGHT_RAY: SpaceId = SpaceId(4);

/// Session with one tracked-pointer controller per hand.
#[derive(Debug, Clone)]
pub struct ScriptedSession {
    sources: Vec<InputSource>,
}

impl ScriptedSession {
    pub const REFERENCE: ReferenceSpace = ReferenceSpace(0);

    pub fn two_controllers() -> Self {
        let source = |hand, ray, grip| InputSource {
            handedness: Some(hand),
            target_ray_mode: TargetRayMode::TrackedPointer,
            target_ray_space: ray,
            grip_space: Some(grip),
        };
        Self {
            sources: vec![
                source(Handedness::Left, LEFT_RAY, LEFT_GRIP),
                source(Handedness::Right, RIGHT_RAY, RIGHT_GRIP),
            ],
        }
    }
}

impl XrSession for ScriptedSession {
    fn input_sources(&self) -> &[InputSource] {
        &self.sources
    }
}

/// One recorded frame. Poses are reported for the grip spaces only.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScriptedFrame {
    pub left: Option<Vec3>,
    pub right: Option<Vec3>,
}

impl From<&RecordedSample> for ScriptedFrame {
    fn from(s: &RecordedSample) -> Self {
        let v = |p: [f64; 3]| Vec3::new(p[0], p[1], p[2]);
        Self {
            left: s.left.map(v),
            right: s.right.map(v),
        }
    }
}

impl XrFrame for ScriptedFrame {
    fn pose(&self, space: SpaceId, reference: ReferenceSpace) -> Option<Vec3> {
        if reference != ScriptedSession::REFERENCE {
            return None;
        }
        match space {
            LEFT_GRIP => self.left,
            RIGHT_GRIP => self.right,
            _ => None,
        }
    }
}
