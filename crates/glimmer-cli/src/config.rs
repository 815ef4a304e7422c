//! Layered configuration system
//!
//! Config is loaded with four layers of precedence (highest wins):
//! 1. Environment variables: `GLIMMER_PARTICLE_COUNT`, `GLIMMER_SNOW_COUNT`, `GLIMMER_SEED`
//! 2. Explicit `--config <path>`, or project-local `./glimmer.toml`
//! 3. Global: `~/.glimmer/config.toml`
//! 4. Built-in defaults
//!
//! Files may set any subset of keys; tables are merged key by key.

use glimmer_core::{GlimmerError, Result};
use glimmer_gesture::GestureConfig;
use glimmer_particles::{
    CameraConfig, ParticleFieldConfig, ParticleSceneConfig, SnowConfig, StarfieldConfig,
    TextLayoutConfig,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PARTICLE_COUNT: &str = "GLIMMER_PARTICLE_COUNT";
pub const ENV_SNOW_COUNT: &str = "GLIMMER_SNOW_COUNT";
pub const ENV_SEED: &str = "GLIMMER_SEED";

/// Everything configurable about a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for every random layout in the scene
    pub seed: u32,
    pub particles: ParticleFieldConfig,
    pub text: TextLayoutConfig,
    pub snow: SnowConfig,
    pub stars: StarfieldConfig,
    pub camera: CameraConfig,
    pub gesture: GestureConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_2512,
            particles: ParticleFieldConfig::default(),
            text: TextLayoutConfig::default(),
            snow: SnowConfig::default(),
            stars: StarfieldConfig::default(),
            camera: CameraConfig::default(),
            gesture: GestureConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load with layered precedence: defaults < global < project (or
    /// `explicit`) < env vars
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Value::try_from(Self::default())?;

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                log::debug!("Loading global config {}", global_path.display());
                merge_values(&mut merged, Self::load_file(&global_path)?);
            }
        }

        match explicit {
            Some(path) => {
                log::debug!("Loading config {}", path.display());
                merge_values(&mut merged, Self::load_file(path)?);
            }
            None => {
                let local_path = PathBuf::from("glimmer.toml");
                if local_path.exists() {
                    log::debug!("Loading project config {}", local_path.display());
                    merge_values(&mut merged, Self::load_file(&local_path)?);
                }
            }
        }

        let mut config: SceneConfig = merged.try_into()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a single TOML document over the defaults (no other layers)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut merged = toml::Value::try_from(Self::default())?;
        let overlay: toml::Value = toml::from_str(content)?;
        merge_values(&mut merged, overlay);
        let config: SceneConfig = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.particle_scene().validate()?;
        self.gesture.validate()
    }

    /// The subset consumed by the particle system
    pub fn particle_scene(&self) -> ParticleSceneConfig {
        ParticleSceneConfig {
            particles: self.particles.clone(),
            text: self.text.clone(),
            snow: self.snow.clone(),
            stars: self.stars.clone(),
            camera: self.camera.clone(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides. `lookup` stands in for `std::env::var`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PARTICLE_COUNT) {
            self.particles.count = parse_env(ENV_PARTICLE_COUNT, &v)?;
        }
        if let Some(v) = lookup(ENV_SNOW_COUNT) {
            self.snow.count = parse_env(ENV_SNOW_COUNT, &v)?;
        }
        if let Some(v) = lookup(ENV_SEED) {
            self.seed = parse_env(ENV_SEED, &v)?;
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".glimmer").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<toml::Value> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            GlimmerError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GlimmerError::ConfigError(format!("{key}={value:?}: {e}")))
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = SceneConfig::default().to_toml_string().unwrap();
        let parsed = SceneConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, SceneConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            seed = 7

            [particles]
            count = 500

            [particles.palette]
            gold = 0xff0000

            [gesture]
            text_hold_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.particles.count, 500);
        assert_eq!(config.particles.tree_height, 14.0);
        assert_eq!(config.particles.palette.gold, 0xff0000);
        assert_eq!(config.particles.palette.gold_hot, 0xfff5aa);
        assert_eq!(config.gesture.text_hold_ms, 2500);
        assert_eq!(config.gesture.open_threshold, 1.6);
        assert_eq!(config.snow.count, 3500);
    }

    #[test]
    fn later_layers_win() {
        let mut base = toml::Value::try_from(SceneConfig::default()).unwrap();
        merge_values(&mut base, toml::from_str("[snow]\ncount = 10\nopacity = 0.5").unwrap());
        merge_values(&mut base, toml::from_str("[snow]\ncount = 20").unwrap());
        let config: SceneConfig = base.try_into().unwrap();
        assert_eq!(config.snow.count, 20);
        assert_eq!(config.snow.opacity, 0.5);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_PARTICLE_COUNT, "1200"),
            (ENV_SNOW_COUNT, " 40 "),
            (ENV_SEED, "99"),
        ]
        .into_iter()
        .collect();
        let mut config = SceneConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.particles.count, 1200);
        assert_eq!(config.snow.count, 40);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn bad_env_value_is_an_error() {
        let mut config = SceneConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == ENV_SEED).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, GlimmerError::ConfigError(_)));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(SceneConfig::from_toml_str("[gesture]\nopen_threshold = 1.0").is_err());
        assert!(SceneConfig::from_toml_str("[particles]\ncount = 0").is_err());
        assert!(SceneConfig::from_toml_str("[camera]\nnear = 0.0").is_err());
    }
}
