use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

/// Where a point input came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointSource {
    /// World-space position supplied directly.
    Position(Vec3),
    /// Current position of a tracked hand, resolved when the event is handled.
    Hand(Handedness),
}

/// Pinch/select event shared by the calibration and anchor placement tools.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointInputEvent {
    pub source: PointSource,
}

impl PointInputEvent {
    pub fn at(position: Vec3) -> Self {
        Self {
            source: PointSource::Position(position),
        }
    }

    pub fn hand(hand: Handedness) -> Self {
        Self {
            source: PointSource::Hand(hand),
        }
    }

    /// World position of this input, if the source can be resolved.
    pub fn resolve(&self, hands: &HandPositions) -> Option<Vec3> {
        match self.source {
            PointSource::Position(position) => Some(position),
            PointSource::Hand(hand) => hands.get(hand),
        }
    }
}

/// Latest tracked hand positions, written by the input-device layer.
#[derive(Resource, Default, Debug, Clone)]
pub struct HandPositions {
    pub left: Option<Vec3>,
    pub right: Option<Vec3>,
}

impl HandPositions {
    pub fn get(&self, hand: Handedness) -> Option<Vec3> {
        match hand {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }
}

/// Drops inputs that arrive within `min_interval` of the last accepted one.
///
/// A single physical pinch can fire several select events; only the first
/// one inside the window is kept.
#[derive(Debug, Clone)]
pub struct InputDebouncer {
    min_interval: Duration,
    last_accepted: Option<Duration>,
}

impl InputDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Check and record an input at `now` in one step. Returns `false` if debounced.
    pub fn try_accept(&mut self, now: Duration) -> bool {
        if let Some(last) = self.last_accepted {
            if now.saturating_sub(last) < self.min_interval {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}
