//! Scale-invariant open/closed hand classification.
//!
//! `ratio = mean(wrist→fingertip) / |wrist→middle MCP|`. An outstretched hand
//! sits near 2, a fist near 1, regardless of distance from the camera.

use crate::config::GestureConfig;
use crate::landmarks::HandLandmarks;
use serde::Serialize;
use std::fmt;

/// Palm scales at or below this are treated as a degenerate detection
const MIN_PALM_SCALE: f32 = 1e-6;

/// One frame's reading of the hand
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Open,
    Closed,
    /// A hand is visible but between the thresholds. Causes no transition.
    Indeterminate,
    /// Nothing detected this frame. Resets open-hand timing.
    NoHand,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gesture::Open => "open",
            Gesture::Closed => "closed",
            Gesture::Indeterminate => "indeterminate",
            Gesture::NoHand => "no hand",
        };
        f.write_str(s)
    }
}

/// Tip/palm ratio, or `None` for a collapsed or non-finite hand
pub fn gesture_ratio(hand: &HandLandmarks) -> Option<f32> {
    if !hand.is_finite() {
        return None;
    }
    let palm = hand.palm_scale();
    if palm <= MIN_PALM_SCALE {
        return None;
    }
    Some(hand.mean_tip_distance() / palm)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureRecognizer {
    open_threshold: f32,
    close_threshold: f32,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            open_threshold: config.open_threshold,
            close_threshold: config.close_threshold,
        }
    }

    /// Both thresholds are strict: a ratio exactly on one is indeterminate
    pub fn classify_ratio(&self, ratio: f32) -> Gesture {
        if ratio > self.open_threshold {
            Gesture::Open
        } else if ratio < self.close_threshold {
            Gesture::Closed
        } else {
            Gesture::Indeterminate
        }
    }

    pub fn classify(&self, hand: Option<&HandLandmarks>) -> Gesture {
        let Some(hand) = hand else {
            return Gesture::NoHand;
        };
        match gesture_ratio(hand) {
            Some(ratio) => self.classify_ratio(ratio),
            None => Gesture::Indeterminate,
        }
    }
}
