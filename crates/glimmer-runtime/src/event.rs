//! Scene events

use glimmer_core::Formation;

/// Something other systems or the host may want to react to
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    /// The shared formation was changed by the gesture machine or an override
    FormationChanged { from: Formation, to: Formation },
    /// Text sampling finished and the text formation is now distinct from scatter
    TextTargetsReady { count: usize },
    /// Text sampling failed; the text formation stays equal to scatter
    TextTargetsFailed(String),
    /// Camera or landmark model became unavailable; gestures read as "no hand"
    GestureInputLost(String),
}
