//! Simulation configuration.
//!
//! Every struct deserializes from a TOML table with all fields optional; the
//! `Default` impls hold the tuned values of the greeting-card scene.

use glimmer_core::{Color, GlimmerError, Result, Vec3};
use serde::{Deserialize, Serialize};

/// Colors as `0xRRGGBB` integers (TOML accepts hex literals)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub needle_light: u32,
    pub needle_dark: u32,
    pub gold: u32,
    pub gold_hot: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            needle_light: 0x0f4d2a,
            needle_dark: 0x032614,
            gold: 0xffcc00,
            gold_hot: 0xfff5aa,
        }
    }
}

impl PaletteConfig {
    pub fn needles(&self) -> [Color; 2] {
        [Color::from_hex(self.needle_light), Color::from_hex(self.needle_dark)]
    }

    pub fn ornaments(&self) -> [Color; 2] {
        [Color::from_hex(self.gold), Color::from_hex(self.gold_hot)]
    }
}

/// Formation particle population, shapes and motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleFieldConfig {
    pub count: usize,
    pub scatter_radius: f32,
    pub tree_height: f32,
    pub tree_base_radius: f32,
    pub ornament_fraction: f32,
    /// Interpolation rate (per second) toward scatter and tree targets
    pub scatter_lerp_rate: f32,
    /// Interpolation rate toward text targets, a little slower for legibility
    pub text_lerp_rate: f32,
    pub repulsion_radius: f32,
    pub repulsion_push: f32,
    /// Scale multiplier applied to every particle in text formation
    pub text_scale: f32,
    pub palette: PaletteConfig,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            count: 4000,
            scatter_radius: 25.0,
            tree_height: 14.0,
            tree_base_radius: 6.5,
            ornament_fraction: 0.15,
            scatter_lerp_rate: 2.5,
            text_lerp_rate: 2.0,
            repulsion_radius: 8.0,
            repulsion_push: 5.0,
            text_scale: 0.7,
            palette: PaletteConfig::default(),
        }
    }
}

impl ParticleFieldConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("particles.count", self.count as f64, 1.0, 200_000.0)?;
        check_range("particles.scatter_radius", self.scatter_radius as f64, 0.01, 1.0e4)?;
        check_range("particles.tree_height", self.tree_height as f64, 0.01, 1.0e4)?;
        check_range("particles.tree_base_radius", self.tree_base_radius as f64, 0.0, 1.0e4)?;
        check_range("particles.ornament_fraction", self.ornament_fraction as f64, 0.0, 1.0)?;
        check_range("particles.scatter_lerp_rate", self.scatter_lerp_rate as f64, 0.0, 1.0e3)?;
        check_range("particles.text_lerp_rate", self.text_lerp_rate as f64, 0.0, 1.0e3)?;
        check_range("particles.repulsion_radius", self.repulsion_radius as f64, 0.0, 1.0e4)?;
        check_range("particles.text_scale", self.text_scale as f64, 0.0, 10.0)?;
        Ok(())
    }
}

/// Two stacked labels for the text formation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLayoutConfig {
    pub primary_text: String,
    pub primary_size: f32,
    pub secondary_text: String,
    pub secondary_size: f32,
    /// Share of the population assigned to the primary label
    pub primary_fraction: f32,
    pub primary_offset_y: f32,
    pub secondary_offset_y: f32,
    /// Lift applied to the whole block so it clears the cake
    pub lift_y: f32,
    /// Full width of the per-axis jitter box
    pub jitter: f32,
    pub depth: f32,
}

impl Default for TextLayoutConfig {
    fn default() -> Self {
        Self {
            primary_text: "W  Y  X".to_string(),
            primary_size: 2.8,
            secondary_text: "H a p p y   B i r t h d a y".to_string(),
            secondary_size: 1.6,
            primary_fraction: 0.25,
            primary_offset_y: 2.0,
            secondary_offset_y: -1.5,
            lift_y: 4.5,
            jitter: 0.02,
            depth: 0.05,
        }
    }
}

impl TextLayoutConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("text.primary_fraction", self.primary_fraction as f64, 0.0, 1.0)?;
        check_range("text.primary_size", self.primary_size as f64, 0.001, 1.0e3)?;
        check_range("text.secondary_size", self.secondary_size as f64, 0.001, 1.0e3)?;
        check_range("text.jitter", self.jitter as f64, 0.0, 10.0)?;
        Ok(())
    }
}

/// Falling snow volume and wind coupling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    pub count: usize,
    /// Half extents of the wraparound volume
    pub bounds: [f32; 3],
    /// Fall speed range, world units per reference frame
    pub fall_speed: [f32; 2],
    pub size: [f32; 2],
    /// Horizontal sine drift, world units per reference frame
    pub drift_amplitude: f32,
    /// Flakes within this (x, y) distance of the pointer catch wind
    pub wind_radius: f32,
    /// Pointer velocity to wind force factor
    pub wind_strength: f32,
    /// Share of the wind force added per reference frame
    pub wind_gain: f32,
    /// Pointer speed clamp (world units per second)
    pub max_pointer_speed: f32,
    /// Velocity multiplier per reference frame
    pub damping_per_frame: f32,
    pub reference_fps: f32,
    pub opacity: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 3500,
            bounds: [30.0, 25.0, 30.0],
            fall_speed: [0.01, 0.05],
            size: [0.02, 0.06],
            drift_amplitude: 0.01,
            wind_radius: 5.0,
            wind_strength: 0.1,
            wind_gain: 0.5,
            max_pointer_speed: 20.0,
            damping_per_frame: 0.95,
            reference_fps: 60.0,
            opacity: 0.7,
        }
    }
}

impl SnowConfig {
    pub fn bounds(&self) -> Vec3 {
        Vec3::from_array(self.bounds)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("snow.count", self.count as f64, 0.0, 500_000.0)?;
        for (axis, b) in ["x", "y", "z"].iter().zip(self.bounds) {
            check_range(&format!("snow.bounds.{axis}"), b as f64, 0.01, 1.0e4)?;
        }
        check_range("snow.damping_per_frame", self.damping_per_frame as f64, 0.0, 1.0)?;
        check_range("snow.reference_fps", self.reference_fps as f64, 1.0, 1000.0)?;
        check_range("snow.wind_radius", self.wind_radius as f64, 0.0, 1.0e4)?;
        if self.fall_speed[0] > self.fall_speed[1] || self.size[0] > self.size[1] {
            return Err(GlimmerError::ConfigError(
                "snow ranges must be given as [min, max]".into(),
            ));
        }
        Ok(())
    }
}

/// Distant background stars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Constant spin about Y, radians per second
    pub spin: f32,
    /// Maximum tilt from pointer parallax, radians
    pub parallax: f32,
    /// Rate at which the tilt follows the pointer, per second
    pub parallax_rate: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            inner_radius: 40.0,
            outer_radius: 90.0,
            spin: 0.01,
            parallax: 0.05,
            parallax_rate: 2.0,
        }
    }
}

impl StarfieldConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("stars.count", self.count as f64, 0.0, 500_000.0)?;
        if self.inner_radius > self.outer_radius {
            return Err(GlimmerError::ConfigError(
                "stars.inner_radius must not exceed stars.outer_radius".into(),
            ));
        }
        Ok(())
    }
}

/// Perspective camera and the plane pointer rays are intersected with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub plane_normal: [f32; 3],
    pub plane_constant: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 4.0, 30.0],
            target: [0.0, 0.0, 0.0],
            fov: 50.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            plane_normal: [0.0, 0.0, 1.0],
            plane_constant: 0.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<()> {
        check_range("camera.fov", self.fov as f64, 1.0, 179.0)?;
        check_range("camera.aspect", self.aspect as f64, 0.01, 100.0)?;
        if self.near <= 0.0 || self.far <= self.near {
            return Err(GlimmerError::ConfigError(
                "camera requires 0 < near < far".into(),
            ));
        }
        if Vec3::from_array(self.plane_normal).length() < 1e-6 {
            return Err(GlimmerError::ConfigError(
                "camera.plane_normal must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the particle side of the scene needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSceneConfig {
    pub particles: ParticleFieldConfig,
    pub text: TextLayoutConfig,
    pub snow: SnowConfig,
    pub stars: StarfieldConfig,
    pub camera: CameraConfig,
}

impl ParticleSceneConfig {
    pub fn validate(&self) -> Result<()> {
        self.particles.validate()?;
        self.text.validate()?;
        self.snow.validate()?;
        self.stars.validate()?;
        self.camera.validate()
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(GlimmerError::ValueOutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        })
    }
}
