//! Gesture thresholds and timing

use glimmer_core::{GlimmerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Tip/palm ratio above which the hand reads as open
    pub open_threshold: f32,
    /// Tip/palm ratio below which the hand reads as a fist
    pub close_threshold: f32,
    /// How long an open hand must be held before the text appears
    pub text_hold_ms: u64,
    /// Minimum spacing between inferences (~24 Hz)
    pub sample_interval_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_threshold: 1.6,
            close_threshold: 1.2,
            text_hold_ms: 5000,
            sample_interval_ms: 42,
        }
    }
}

impl GestureConfig {
    pub fn text_hold(&self) -> Duration {
        Duration::from_millis(self.text_hold_ms)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.close_threshold > 0.0) || !self.open_threshold.is_finite() {
            return Err(GlimmerError::ConfigError(
                "gesture thresholds must be positive and finite".into(),
            ));
        }
        if self.close_threshold >= self.open_threshold {
            return Err(GlimmerError::ConfigError(format!(
                "gesture.close_threshold ({}) must be below gesture.open_threshold ({})",
                self.close_threshold, self.open_threshold
            )));
        }
        if self.sample_interval_ms > 10_000 {
            return Err(GlimmerError::ValueOutOfRange {
                field: "gesture.sample_interval_ms".into(),
                min: 0.0,
                max: 10_000.0,
                value: self.sample_interval_ms as f64,
            });
        }
        Ok(())
    }
}
