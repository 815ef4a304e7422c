//! Per-frame snapshot shared by every system

use glimmer_core::{Formation, Vec2, Vec3};

/// Everything a system may read about the current frame.
///
/// Built once per frame by the host loop and passed by reference, so every
/// consumer in the frame agrees on the formation and the interaction point
/// even if the gesture side changes the formation mid-frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub formation: Formation,
    /// Pointer projected onto the interaction plane, if there was a hit
    pub interaction_point: Option<Vec3>,
    /// Raw pointer in normalized device coordinates
    pub pointer_ndc: Option<Vec2>,
    /// Accumulated animation time in seconds
    pub elapsed: f64,
}

impl FrameContext {
    pub fn new(formation: Formation, elapsed: f64) -> Self {
        Self {
            formation,
            interaction_point: None,
            pointer_ndc: None,
            elapsed,
        }
    }

    pub fn with_pointer(mut self, ndc: Option<Vec2>, interaction_point: Option<Vec3>) -> Self {
        self.pointer_ndc = ndc;
        self.interaction_point = interaction_point;
        self
    }
}
