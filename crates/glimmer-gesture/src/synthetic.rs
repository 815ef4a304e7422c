//! Synthetic hands, a scripted landmark model and a fake camera, for
//! headless runs and tests.

use crate::landmarks::{HandLandmarks, FINGERTIPS, LANDMARK_COUNT, MIDDLE_MCP, WRIST};
use crate::source::{FrameSource, LandmarkModel, VideoFrame};
use glimmer_core::{GlimmerError, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hand with the given tip/palm `ratio`, `palm` scale and wrist at `origin`.
///
/// Fingers fan upward (image y decreases) from the wrist; joints between
/// knuckle and tip are spaced evenly along each finger.
pub fn hand_with_ratio(ratio: f32, palm: f32, origin: Vec3) -> HandLandmarks {
    let mut points = [origin; LANDMARK_COUNT];
    let tip_distance = ratio * palm;

    // Thumb: landmarks 1..=4 out to the side
    for (j, idx) in (1..=4).enumerate() {
        let t = (j + 1) as f32 / 4.0;
        points[idx] = origin + Vec3::new(-0.8 * palm * t, -0.4 * palm * t, 0.0);
    }

    // Fingers: MCP at idx, then PIP, DIP and the tip
    let spread = [-0.25_f32, 0.0, 0.2, 0.4];
    for (finger, (&tip, &angle)) in FINGERTIPS.iter().zip(&spread).enumerate() {
        let dir = Vec3::new(angle.sin(), -angle.cos(), 0.0);
        let mcp = tip - 3;
        let knuckle = if mcp == MIDDLE_MCP {
            dir * palm
        } else {
            dir * palm * (0.95 - 0.05 * finger as f32)
        };
        points[mcp] = origin + knuckle;
        for k in 1..=3 {
            let t = k as f32 / 3.0;
            let along = knuckle.length() + (tip_distance - knuckle.length()) * t;
            points[mcp + k] = origin + dir * along;
        }
    }

    points[WRIST] = origin;
    HandLandmarks(points)
}

/// Pose in a gesture script
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandPose {
    /// Fingers spread, ratio about 2
    Open,
    /// Fingers curled, ratio about 0.9
    Fist,
    /// Between the thresholds
    Relaxed,
    /// No hand in view
    None,
    /// The detector fails on this frame
    Glitch,
}

impl HandPose {
    pub fn ratio(self) -> Option<f32> {
        match self {
            HandPose::Open => Some(2.0),
            HandPose::Fist => Some(0.9),
            HandPose::Relaxed => Some(1.4),
            HandPose::None | HandPose::Glitch => None,
        }
    }

    pub fn landmarks(self) -> Option<HandLandmarks> {
        self.ratio()
            .map(|r| hand_with_ratio(r, 0.12, Vec3::new(0.5, 0.7, 0.0)))
    }
}

/// One entry of a gesture timeline: hold `pose` from `at` until the next entry
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub pose: HandPose,
}

/// Landmark model that replays a timeline keyed on frame timestamps
#[derive(Clone, Debug, Default)]
pub struct ScriptedModel {
    steps: Vec<ScriptStep>,
}

impl ScriptedModel {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at_ms);
        Self { steps }
    }

    /// Pose in effect at `time`. Before the first step there is no hand.
    pub fn pose_at(&self, time: Duration) -> HandPose {
        let ms = time.as_millis() as u64;
        self.steps
            .iter()
            .take_while(|s| s.at_ms <= ms)
            .last()
            .map(|s| s.pose)
            .unwrap_or(HandPose::None)
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

impl LandmarkModel for ScriptedModel {
    fn detect(&mut self, frame: &VideoFrame, _now: Duration) -> Result<Option<Vec<Vec3>>> {
        let pose = self.pose_at(frame.timestamp);
        if pose == HandPose::Glitch {
            return Err(GlimmerError::DetectionError(format!(
                "scripted failure at {} ms",
                frame.timestamp.as_millis()
            )));
        }
        Ok(pose.landmarks().map(|hand| hand.0.to_vec()))
    }
}

/// Camera delivering pixel-less frames at a fixed rate
#[derive(Debug)]
pub struct SyntheticCamera {
    period: Duration,
    released: Arc<AtomicBool>,
}

impl SyntheticCamera {
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that flips once the camera has been released
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameSource for SyntheticCamera {
    fn latest_frame(&mut self, now: Duration) -> Result<Option<VideoFrame>> {
        if self.released.load(Ordering::Acquire) {
            return Err(GlimmerError::CaptureError("camera released".into()));
        }
        let index = (now.as_secs_f64() / self.period.as_secs_f64()).floor() as u32;
        Ok(Some(VideoFrame {
            timestamp: self.period * index,
            width: 320,
            height: 240,
            pixels: Vec::new(),
        }))
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::gesture_ratio;

    #[test]
    fn poses_have_their_ratio() {
        for pose in [HandPose::Open, HandPose::Fist, HandPose::Relaxed] {
            let hand = pose.landmarks().unwrap();
            let ratio = gesture_ratio(&hand).unwrap();
            assert!((ratio - pose.ratio().unwrap()).abs() < 1e-3, "{pose:?} {ratio}");
        }
        assert!(HandPose::None.landmarks().is_none());
    }

    #[test]
    fn script_holds_poses_between_steps() {
        let model = ScriptedModel::new(vec![
            ScriptStep { at_ms: 1000, pose: HandPose::Fist },
            ScriptStep { at_ms: 0, pose: HandPose::Open },
        ]);
        assert_eq!(model.pose_at(Duration::from_millis(0)), HandPose::Open);
        assert_eq!(model.pose_at(Duration::from_millis(999)), HandPose::Open);
        assert_eq!(model.pose_at(Duration::from_millis(1000)), HandPose::Fist);
        assert_eq!(model.pose_at(Duration::from_secs(60)), HandPose::Fist);
    }

    #[test]
    fn empty_script_has_no_hand() {
        let model = ScriptedModel::default();
        assert_eq!(model.pose_at(Duration::from_secs(1)), HandPose::None);
    }

    #[test]
    fn glitch_fails_detection() {
        let mut model = ScriptedModel::new(vec![ScriptStep { at_ms: 0, pose: HandPose::Glitch }]);
        let frame = VideoFrame::default();
        assert!(model.detect(&frame, Duration::ZERO).is_err());
    }

    #[test]
    fn camera_repeats_timestamp_within_a_frame() {
        let mut cam = SyntheticCamera::new(30.0);
        let a = cam.latest_frame(Duration::from_millis(10)).unwrap().unwrap();
        let b = cam.latest_frame(Duration::from_millis(20)).unwrap().unwrap();
        let c = cam.latest_frame(Duration::from_millis(40)).unwrap().unwrap();
        assert_eq!(a.timestamp, b.timestamp);
        assert_ne!(b.timestamp, c.timestamp);
    }

    #[test]
    fn released_camera_errors() {
        let mut cam = SyntheticCamera::new(30.0);
        let flag = cam.release_flag();
        cam.release();
        assert!(flag.load(Ordering::Acquire));
        assert!(cam.latest_frame(Duration::ZERO).is_err());
    }
}
