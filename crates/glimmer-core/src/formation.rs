//! The formation selector shared by every particle consumer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which target shape the formation particles are moving toward.
///
/// Exactly one formation is active at a time. It is written by the gesture
/// state machine (or a manual override) and read by the particle field, the
/// set pieces and the camera controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formation {
    Scattered,
    #[default]
    Tree,
    Text,
}

impl Formation {
    pub const ALL: [Formation; 3] = [Formation::Scattered, Formation::Tree, Formation::Text];

    /// Compact encoding for lock-free sharing
    pub const fn as_u8(self) -> u8 {
        match self {
            Formation::Scattered => 0,
            Formation::Tree => 1,
            Formation::Text => 2,
        }
    }

    /// Decode from [`Formation::as_u8`]. Unknown values fall back to `Tree`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Formation::Scattered,
            2 => Formation::Text,
            _ => Formation::Tree,
        }
    }

    /// Whether pointer repulsion acts on the formation particles.
    /// The assembled tree keeps its silhouette.
    pub fn allows_interaction(self) -> bool {
        matches!(self, Formation::Scattered | Formation::Text)
    }

    /// Camera auto-rotation runs only while the tree is assembled.
    pub fn auto_rotates(self) -> bool {
        self == Formation::Tree
    }

    /// Manual "toggle" fallback: tree scatters, anything else regroups.
    pub fn toggled(self) -> Self {
        match self {
            Formation::Tree => Formation::Scattered,
            _ => Formation::Tree,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Formation::Scattered => "scattered",
            Formation::Tree => "tree",
            Formation::Text => "text",
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
