//! Hand landmarks as produced by a 21-point hand tracker.

use glimmer_core::{GlimmerError, Result, Vec3};
use serde::{Deserialize, Serialize};

pub const LANDMARK_COUNT: usize = 21;
pub const WRIST: usize = 0;
/// Base knuckle of the middle finger
pub const MIDDLE_MCP: usize = 9;
/// Index, middle, ring and pinky tips
pub const FINGERTIPS: [usize; 4] = [8, 12, 16, 20];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks(pub [Vec3; LANDMARK_COUNT]);

impl HandLandmarks {
    /// Rejects anything but exactly 21 points
    pub fn from_slice(points: &[Vec3]) -> Result<Self> {
        let points: [Vec3; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| GlimmerError::InvalidLandmarks {
                    expected: LANDMARK_COUNT,
                    got: points.len(),
                })?;
        Ok(Self(points))
    }

    /// From `[x, y, z]` triples, e.g. parsed JSON
    pub fn from_arrays(points: &[[f32; 3]]) -> Result<Self> {
        let points: Vec<Vec3> = points.iter().copied().map(Vec3::from_array).collect();
        Self::from_slice(&points)
    }

    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.0.get(index).copied()
    }

    pub fn wrist(&self) -> Vec3 {
        self.0[WRIST]
    }

    /// Wrist to middle-finger base distance. Normalizes for how far the hand
    /// is from the camera.
    pub fn palm_scale(&self) -> f32 {
        self.0[WRIST].distance(self.0[MIDDLE_MCP])
    }

    /// Mean wrist-to-fingertip distance over the four fingers
    pub fn mean_tip_distance(&self) -> f32 {
        let wrist = self.wrist();
        let total: f32 = FINGERTIPS.iter().map(|&i| self.0[i].distance(wrist)).sum();
        total / FINGERTIPS.len() as f32
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|p| p.is_finite())
    }
}
