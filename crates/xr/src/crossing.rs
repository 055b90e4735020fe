//! Hand-crossing gesture detector.
//!
//! A crossing is a flip in which of the two controllers is higher. Flips are
//! only counted when the hands are clearly apart (`min_separation`) and the
//! previous counted crossing is at least `cooldown_s` old.

use foundation::Time;
use tracing::{debug, trace};

use crate::pose::{ControllerPair, ControllerPose, Handedness};

pub const DEFAULT_COOLDOWN_S: f64 = 0.3;
/// Meters in WebXR reference space.
pub const DEFAULT_MIN_SEPARATION: f64 = 0.02;

// Timestamps that land exactly on the cooldown boundary count as elapsed even
// after float rounding in the subtraction.
const TIME_EPSILON_S: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum VerticalOrder {
    LeftAbove,
    RightAbove,
    #[default]
    Unknown,
}

impl VerticalOrder {
    fn from_left_above(is_left_above: bool) -> Self {
        if is_left_above {
            VerticalOrder::LeftAbove
        } else {
            VerticalOrder::RightAbove
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DetectorPhase {
    /// Both hands have not yet been seen together.
    Uninitialized,
    Tracking,
}

/// What happens to the baseline when one hand drops out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TrackingLossPolicy {
    /// Keep the last vertical order; a flip across the gap still counts.
    #[default]
    Pause,
    /// Forget the vertical order; the next two-hand sample is a new baseline.
    Rebaseline,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CrossingConfig {
    pub cooldown_s: f64,
    pub min_separation: f64,
    pub tracking_loss: TrackingLossPolicy,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            cooldown_s: DEFAULT_COOLDOWN_S,
            min_separation: DEFAULT_MIN_SEPARATION,
            tracking_loss: TrackingLossPolicy::Pause,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CrossingState {
    pub left_count: u32,
    pub right_count: u32,
    pub last_crossing: Option<Time>,
    pub previous_order: VerticalOrder,
    pub both_hands_ever_tracked: bool,
}

impl CrossingState {
    pub fn total(&self) -> u32 {
        self.left_count + self.right_count
    }
}

/// Result of feeding one sample to the detector.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CrossingOutcome {
    pub occurred: bool,
    /// Hand that ended up below after the flip; `Some` only when `occurred`.
    pub triggering_hand: Option<Handedness>,
    pub total: u32,
    pub left_count: u32,
    pub right_count: u32,
    /// `0.0` when either hand was missing.
    pub y_difference: f64,
}

pub type CountCallback = Box<dyn FnMut(u32, Handedness)>;

/// One detector per immersive session, owned by whoever drives the frame loop.
pub struct CrossingDetector {
    config: CrossingConfig,
    state: CrossingState,
    left_tally: u32,
    right_tally: u32,
    on_count: Option<CountCallback>,
}

impl std::fmt::Debug for CrossingDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossingDetector")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("left_tally", &self.left_tally)
            .field("right_tally", &self.right_tally)
            .field("on_count", &self.on_count.is_some())
            .finish()
    }
}

impl Default for CrossingDetector {
    fn default() -> Self {
        Self::new(CrossingConfig::default())
    }
}

impl CrossingDetector {
    pub fn new(config: CrossingConfig) -> Self {
        Self {
            config,
            state: CrossingState::default(),
            left_tally: 0,
            right_tally: 0,
            on_count: None,
        }
    }

    /// Called with `(total, triggering_hand)` on every counted crossing.
    pub fn set_on_count(&mut self, callback: impl FnMut(u32, Handedness) + 'static) {
        self.on_count = Some(Box::new(callback));
    }

    pub fn config(&self) -> &CrossingConfig {
        &self.config
    }

    pub fn state(&self) -> &CrossingState {
        &self.state
    }

    pub fn total(&self) -> u32 {
        self.state.total()
    }

    pub fn phase(&self) -> DetectorPhase {
        if self.state.both_hands_ever_tracked {
            DetectorPhase::Tracking
        } else {
            DetectorPhase::Uninitialized
        }
    }

    /// Crossings actually triggered by `hand`, as opposed to the
    /// `left_count`/`right_count` split of the total.
    pub fn hand_tally(&self, hand: Handedness) -> u32 {
        match hand {
            Handedness::Left => self.left_tally,
            Handedness::Right => self.right_tally,
        }
    }

    pub fn reset(&mut self) {
        self.state = CrossingState::default();
        self.left_tally = 0;
        self.right_tally = 0;
    }

    fn idle_outcome(&self, y_difference: f64) -> CrossingOutcome {
        CrossingOutcome {
            occurred: false,
            triggering_hand: None,
            total: self.state.total(),
            left_count: self.state.left_count,
            right_count: self.state.right_count,
            y_difference,
        }
    }

    pub fn update(&mut self, pair: &ControllerPair, now: Time) -> CrossingOutcome {
        self.update_poses(pair.left, pair.right, now)
    }

    pub fn update_poses(
        &mut self,
        left: Option<ControllerPose>,
        right: Option<ControllerPose>,
        now: Time,
    ) -> CrossingOutcome {
        let usable = |p: Option<ControllerPose>| p.filter(|p| p.is_tracked && p.position.is_finite());
        let (Some(left), Some(right)) = (usable(left), usable(right)) else {
            if self.config.tracking_loss == TrackingLossPolicy::Rebaseline {
                self.state.previous_order = VerticalOrder::Unknown;
            }
            return self.idle_outcome(0.0);
        };

        let is_left_above = left.position.y > right.position.y;
        let y_difference = left.position.vertical_gap(right.position);
        let order = VerticalOrder::from_left_above(is_left_above);
        let previous = std::mem::replace(&mut self.state.previous_order, order);

        if previous == VerticalOrder::Unknown {
            self.state.both_hands_ever_tracked = true;
            trace!(?order, "crossing baseline established");
            return self.idle_outcome(y_difference);
        }

        let flipped = previous != order;
        let cooled_down = self
            .state
            .last_crossing
            .is_none_or(|last| now.since(last) + TIME_EPSILON_S >= self.config.cooldown_s);
        let separated = y_difference > self.config.min_separation;

        if !(flipped && cooled_down && separated) {
            if flipped {
                trace!(cooled_down, separated, y_difference, "flip not counted");
            }
            return self.idle_outcome(y_difference);
        }

        let total = self.state.total() + 1;
        self.state.left_count = total.div_ceil(2);
        self.state.right_count = total / 2;
        self.state.last_crossing = Some(now);

        // Credited to the hand that went down, the one now below.
        let hand = if is_left_above {
            Handedness::Right
        } else {
            Handedness::Left
        };
        match hand {
            Handedness::Left => self.left_tally += 1,
            Handedness::Right => self.right_tally += 1,
        }
        debug!(total, %hand, y_difference, "crossing counted");

        if let Some(callback) = self.on_count.as_mut() {
            callback(total, hand);
        }

        CrossingOutcome {
            occurred: true,
            triggering_hand: Some(hand),
            total,
            left_count: self.state.left_count,
            right_count: self.state.right_count,
            y_difference,
        }
    }
}
