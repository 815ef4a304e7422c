//! Classify command

use crate::config::SceneConfig;
use anyhow::{Context, Result};
use glimmer_gesture::{gesture_ratio, Gesture, GestureConfig, GestureRecognizer, HandLandmarks};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct Classification {
    pub palm_scale: f32,
    pub mean_tip_distance: f32,
    pub ratio: Option<f32>,
    pub gesture: Gesture,
}

pub fn run(landmarks_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = SceneConfig::load(config_path).context("Failed to load config")?;
    let content = std::fs::read_to_string(landmarks_path)
        .with_context(|| format!("Failed to read {}", landmarks_path.display()))?;
    let result = classify_json(&content, &config.gesture)?;

    println!("Palm scale:        {:.4}", result.palm_scale);
    println!("Mean tip distance: {:.4}", result.mean_tip_distance);
    match result.ratio {
        Some(ratio) => println!("Ratio:             {:.3}", ratio),
        None => println!("Ratio:             (degenerate hand)"),
    }
    println!(
        "Gesture:           {} (open > {}, closed < {})",
        result.gesture, config.gesture.open_threshold, config.gesture.close_threshold
    );
    Ok(())
}

pub fn classify_json(content: &str, config: &GestureConfig) -> Result<Classification> {
    let points: Vec<[f32; 3]> =
        serde_json::from_str(content).context("Expected a JSON array of [x, y, z] points")?;
    let hand = HandLandmarks::from_arrays(&points)?;
    let recognizer = GestureRecognizer::new(config);

    Ok(Classification {
        palm_scale: hand.palm_scale(),
        mean_tip_distance: hand.mean_tip_distance(),
        ratio: gesture_ratio(&hand),
        gesture: recognizer.classify(Some(&hand)),
    })
}
