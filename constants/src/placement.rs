/// Minimum interval between accepted point inputs during anchor placement (milliseconds)
pub const ANCHOR_INPUT_DEBOUNCE_MS: u64 = 500;

/// Inclusive range of anchors a single object can carry
pub const MIN_ANCHOR_COUNT: u8 = 1;
pub const MAX_ANCHOR_COUNT: u8 = 4;

/// Anchor count a new placement session starts with
pub const DEFAULT_ANCHOR_COUNT: u8 = 2;

/// Local z offset applied to every anchor so markers sit in front of the object face
pub const ANCHOR_Z_OFFSET: f32 = 0.01;

pub struct AnchorLayout {
    pub count: u8,
    /// Normalized (x, y) positions, origin at the top-left corner, y pointing down.
    pub positions: &'static [[f32; 2]],
}

pub const DEFAULT_ANCHOR_LAYOUTS: &[AnchorLayout] = &[
    AnchorLayout {
        count: 1,
        positions: &[[0.5, 0.5]],
    },
    AnchorLayout {
        count: 2,
        positions: &[[0.5, 0.25], [0.5, 0.75]],
    },
    AnchorLayout {
        count: 3,
        positions: &[[0.5, 0.2], [0.2, 0.8], [0.8, 0.8]],
    },
    AnchorLayout {
        count: 4,
        positions: &[[0.2, 0.2], [0.8, 0.2], [0.8, 0.8], [0.2, 0.8]],
    },
];

/// Look up the default normalized layout for an anchor count.
pub fn default_layout(count: u8) -> Option<&'static [[f32; 2]]> {
    DEFAULT_ANCHOR_LAYOUTS
        .iter()
        .find(|layout| layout.count == count)
        .map(|layout| layout.positions)
}
