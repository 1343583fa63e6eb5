use std::time::Duration;

use bevy::prelude::*;
use constants::placement::{
    ANCHOR_INPUT_DEBOUNCE_MS, ANCHOR_Z_OFFSET, DEFAULT_ANCHOR_COUNT, MAX_ANCHOR_COUNT,
    MIN_ANCHOR_COUNT,
};
use thiserror::Error;

use crate::engine::scene::Anchor;
use crate::tools::input::InputDebouncer;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("anchor count {0} outside 1..=4")]
    AnchorCountOutOfRange(u8),

    #[error("input debounce interval must be greater than zero")]
    NonPositiveInterval,
}

pub fn validate_anchor_count(count: u8) -> Result<u8, ConfigError> {
    if (MIN_ANCHOR_COUNT..=MAX_ANCHOR_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(ConfigError::AnchorCountOutOfRange(count))
    }
}

/// Tuning for the anchor placement workflow.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AnchorPlacementConfig {
    /// Manual inputs closer together than this are dropped.
    pub input_debounce: Duration,
    /// Offset along the object normal so markers don't z-fight with the face.
    pub anchor_z_offset: f32,
    pub default_anchor_count: u8,
}

impl AnchorPlacementConfig {
    pub fn new(
        input_debounce: Duration,
        anchor_z_offset: f32,
        default_anchor_count: u8,
    ) -> Result<Self, ConfigError> {
        if input_debounce.is_zero() {
            return Err(ConfigError::NonPositiveInterval);
        }
        Ok(Self {
            input_debounce,
            anchor_z_offset,
            default_anchor_count: validate_anchor_count(default_anchor_count)?,
        })
    }
}

impl Default for AnchorPlacementConfig {
    fn default() -> Self {
        Self {
            input_debounce: Duration::from_millis(ANCHOR_INPUT_DEBOUNCE_MS),
            anchor_z_offset: ANCHOR_Z_OFFSET,
            default_anchor_count: DEFAULT_ANCHOR_COUNT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementStep {
    #[default]
    Idle,
    Selecting,
    Placing,
    Preview,
}

/// Working state of the current placement session.
///
/// `anchors` and `anchor_markers` are index-aligned and always change
/// together with `step`.
#[derive(Resource, Debug)]
pub struct AnchorPlacementState {
    pub step: PlacementStep,
    pub current_object_id: Option<String>,
    pub anchors: Vec<Anchor>,
    pub anchor_markers: Vec<Entity>,
    pub anchor_count: u8,
    pub auto_placed: bool,
    pub debouncer: InputDebouncer,
}

impl AnchorPlacementState {
    pub fn new(config: &AnchorPlacementConfig) -> Self {
        Self {
            step: PlacementStep::Idle,
            current_object_id: None,
            anchors: Vec::new(),
            anchor_markers: Vec::new(),
            anchor_count: config.default_anchor_count,
            auto_placed: false,
            debouncer: InputDebouncer::new(config.input_debounce),
        }
    }

    pub fn placed_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_full(&self) -> bool {
        self.anchors.len() >= self.anchor_count as usize
    }

    /// Remove working anchors and return their marker entities for despawning.
    pub fn clear_working(&mut self) -> Vec<Entity> {
        self.anchors.clear();
        self.auto_placed = false;
        std::mem::take(&mut self.anchor_markers)
    }

    /// Append an anchor and enter `Preview` once the target count is reached.
    pub fn push_anchor(&mut self, anchor: Anchor, marker: Entity) {
        self.anchors.push(anchor);
        self.anchor_markers.push(marker);
        if self.is_full() {
            self.step = PlacementStep::Preview;
        }
    }

    /// Drop the most recent anchors beyond the target count.
    pub fn truncate_to_count(&mut self) -> Vec<Entity> {
        let count = self.anchor_count as usize;
        self.anchors.truncate(count);
        if self.anchor_markers.len() > count {
            self.anchor_markers.split_off(count)
        } else {
            Vec::new()
        }
    }

    /// Back to `Idle` with no object. Returns markers to despawn.
    pub fn reset_to_idle(&mut self) -> Vec<Entity> {
        let markers = self.clear_working();
        self.step = PlacementStep::Idle;
        self.current_object_id = None;
        markers
    }
}

impl FromWorld for AnchorPlacementState {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource_or_init::<AnchorPlacementConfig>();
        Self::new(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(index: usize) -> Anchor {
        Anchor {
            id: format!("anchor_0_{index}"),
            object_id: "frame".to_string(),
            position: Vec3::ZERO,
        }
    }

    #[test]
    fn config_rejects_invalid_values() {
        assert_eq!(
            AnchorPlacementConfig::new(Duration::from_millis(500), 0.01, 5),
            Err(ConfigError::AnchorCountOutOfRange(5))
        );
        assert_eq!(
            AnchorPlacementConfig::new(Duration::ZERO, 0.01, 2),
            Err(ConfigError::NonPositiveInterval)
        );
        assert!(AnchorPlacementConfig::new(Duration::from_millis(200), 0.0, 4).is_ok());
    }

    #[test]
    fn push_anchor_enters_preview_with_final_anchor() {
        let mut state = AnchorPlacementState::new(&AnchorPlacementConfig::default());
        state.step = PlacementStep::Placing;
        state.push_anchor(anchor(0), Entity::PLACEHOLDER);
        assert_eq!(state.step, PlacementStep::Placing);
        state.push_anchor(anchor(1), Entity::PLACEHOLDER);
        assert_eq!(state.step, PlacementStep::Preview);
        assert_eq!(state.placed_count(), 2);
    }

    #[test]
    fn truncate_drops_most_recent() {
        let mut state = AnchorPlacementState::new(&AnchorPlacementConfig::default());
        state.anchor_count = 3;
        for i in 0..3 {
            state.push_anchor(anchor(i), Entity::PLACEHOLDER);
        }
        state.anchor_count = 1;
        let dropped = state.truncate_to_count();
        assert_eq!(dropped.len(), 2);
        assert_eq!(state.anchors[0].id, "anchor_0_0");
        assert_eq!(state.anchor_markers.len(), 1);
    }
}
