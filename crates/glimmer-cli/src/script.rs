//! Gesture scripts for headless runs
//!
//! A script is a TOML file of timed poses:
//!
//! ```toml
//! [[step]]
//! at_ms = 500
//! pose = "open"
//!
//! [[step]]
//! at_ms = 8000
//! pose = "fist"
//! ```

use glimmer_core::{GlimmerError, Result};
use glimmer_gesture::synthetic::{HandPose, ScriptStep, ScriptedModel};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    #[serde(default, rename = "step")]
    pub steps: Vec<ScriptStep>,
}

impl GestureScript {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let script: GestureScript = toml::from_str(content)?;
        if script.steps.is_empty() {
            return Err(GlimmerError::ConfigError(
                "gesture script has no [[step]] entries".into(),
            ));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Open the hand, hold it until the text appears, close it, then leave.
    pub fn demo() -> Self {
        Self {
            steps: vec![
                ScriptStep { at_ms: 500, pose: HandPose::Open },
                ScriptStep { at_ms: 8000, pose: HandPose::Fist },
                ScriptStep { at_ms: 9000, pose: HandPose::None },
            ],
        }
    }

    /// Time of the last step
    pub fn duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.at_ms).max().unwrap_or(0)
    }

    pub fn into_model(self) -> ScriptedModel {
        ScriptedModel::new(self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_steps() {
        let script = GestureScript::from_toml_str(
            r#"
            [[step]]
            at_ms = 2000
            pose = "fist"

            [[step]]
            at_ms = 100
            pose = "open"

            [[step]]
            at_ms = 3000
            pose = "glitch"
            "#,
        )
        .unwrap();
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.duration_ms(), 3000);

        let model = script.into_model();
        assert_eq!(model.pose_at(Duration::from_millis(50)), HandPose::None);
        assert_eq!(model.pose_at(Duration::from_millis(150)), HandPose::Open);
        assert_eq!(model.pose_at(Duration::from_millis(2500)), HandPose::Fist);
        assert_eq!(model.pose_at(Duration::from_millis(3000)), HandPose::Glitch);
    }

    #[test]
    fn empty_script_rejected() {
        assert!(GestureScript::from_toml_str("").is_err());
    }

    #[test]
    fn unknown_pose_rejected() {
        let err = GestureScript::from_toml_str("[[step]]\nat_ms = 1\npose = \"wave\"");
        assert!(matches!(err, Err(GlimmerError::TomlParseError(_))));
    }

    #[test]
    fn demo_reaches_text_before_closing() {
        let script = GestureScript::demo();
        let open = script.steps[0].at_ms;
        let close = script.steps[1].at_ms;
        assert!(close - open > 5000);
    }
}
