use foundation::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One controller's position for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerPose {
    pub position: Vec3,
    pub handedness: Handedness,
    pub is_tracked: bool,
}

impl ControllerPose {
    pub fn tracked(handedness: Handedness, position: Vec3) -> Self {
        Self {
            position,
            handedness,
            is_tracked: true,
        }
    }
}

/// Both hands for one frame; `None` means untracked this frame.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ControllerPair {
    pub left: Option<ControllerPose>,
    pub right: Option<ControllerPose>,
}

impl ControllerPair {
    pub fn both(&self) -> Option<(ControllerPose, ControllerPose)> {
        match (self.left, self.right) {
            (Some(l), Some(r)) if l.is_tracked && r.is_tracked => Some((l, r)),
            _ => None,
        }
    }

    pub fn tracked_count(&self) -> usize {
        [self.left, self.right]
            .iter()
            .filter(|p| p.is_some_and(|p| p.is_tracked))
            .count()
    }
}

/// Mirrors WebXR `XRTargetRayMode`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetRayMode {
    Gaze,
    TrackedPointer,
    Screen,
    TransientPointer,
}

/// Opaque handle to an XR space owned by the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpaceId(pub u32);

/// Opaque handle to the reference space poses are expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceSpace(pub u32);

/// Mirrors the parts of WebXR `XRInputSource` the sampler needs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputSource {
    /// `None` for sources without a hand (gaze, screen).
    pub handedness: Option<Handedness>,
    pub target_ray_mode: TargetRayMode,
    pub target_ray_space: SpaceId,
    pub grip_space: Option<SpaceId>,
}

/// Immersive session: exposes its currently connected input sources.
pub trait XrSession {
    fn input_sources(&self) -> &[InputSource];
}

/// One animation frame of a session.
pub trait XrFrame {
    /// Position of `space` in `reference`, or `None` if the platform cannot
    /// supply a pose this frame.
    fn pose(&self, space: SpaceId, reference: ReferenceSpace) -> Option<Vec3>;
}
