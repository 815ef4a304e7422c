//! Glimmer Particles - Formation, snow and starfield simulation
//!
//! Provides the CPU side of the greeting-card scene:
//! - Seeded target sampling (scatter ball, spiral tree, text mesh surfaces)
//! - The formation field interpolating between scatter, tree and text
//! - Pointer unprojection and radial repulsion
//! - Ambient snow with pointer wind, background starfield, tree topper and cake
//! - Instance packing for instanced draw calls

pub mod config;
pub mod curves;
pub mod field;
pub mod glyphs;
pub mod interaction;
pub mod particle;
pub mod rand;
pub mod sampler;
pub mod set_pieces;
pub mod snow;
pub mod starfield;
pub mod text;

use glimmer_core::{Formation, Result};
use glimmer_runtime::{EventBus, FrameContext, RuntimeSystem, SceneEvent};

pub use config::{
    CameraConfig, PaletteConfig, ParticleFieldConfig, ParticleSceneConfig, SnowConfig,
    StarfieldConfig, TextLayoutConfig,
};
pub use field::ParticleField;
pub use glyphs::BlockFont;
pub use interaction::{Camera, InteractionResolver, Plane, Ray};
pub use particle::{Particle, ParticleInstance, ParticleKind};
pub use sampler::{MeshSampler, TreeShape, TriangleMesh};
pub use set_pieces::{BirthdayCake, TreeTopper};
pub use snow::SnowField;
pub use starfield::Starfield;
pub use text::{TextMeshSource, TextTargetsTask};

/// The whole particle scene - implements RuntimeSystem for the frame loop.
pub struct ParticleSystem {
    pub field: ParticleField,
    pub snow: SnowField,
    pub stars: Starfield,
    pub topper: TreeTopper,
    pub cake: BirthdayCake,
    /// Pointer unprojection for the host building each `FrameContext`
    pub resolver: InteractionResolver,
    text_layout: TextLayoutConfig,
    text_seed: u32,
    text_task: Option<TextTargetsTask>,
    events: EventBus,
}

impl ParticleSystem {
    pub fn new(config: &ParticleSceneConfig, seed: u32) -> Result<Self> {
        config.validate()?;
        let mut rng = rand::ParticleRng::new(seed);
        let mut field_rng = rng.fork();
        let snow_rng = rng.fork();
        let mut star_rng = rng.fork();
        let text_seed = rng.next_u32();

        Ok(Self {
            field: ParticleField::new(config.particles.clone(), &mut field_rng),
            snow: SnowField::new(config.snow.clone(), snow_rng),
            stars: Starfield::new(config.stars.clone(), &config.particles.palette, &mut star_rng),
            topper: TreeTopper::new(config.particles.tree_height),
            cake: BirthdayCake::new(),
            resolver: InteractionResolver::from_config(&config.camera),
            text_layout: config.text.clone(),
            text_seed,
            text_task: None,
            events: EventBus::new(),
        })
    }

    /// Start sampling text targets in the background. Until the result
    /// arrives the text formation keeps using scatter positions.
    pub fn load_text_targets<S>(&mut self, source: S)
    where
        S: TextMeshSource + 'static,
    {
        log::debug!(
            "Sampling text targets for {:?} / {:?}",
            self.text_layout.primary_text,
            self.text_layout.secondary_text
        );
        self.text_task = Some(TextTargetsTask::spawn(
            source,
            self.text_layout.clone(),
            self.field.len(),
            self.text_seed,
        ));
    }

    pub fn text_pending(&self) -> bool {
        self.text_task.is_some()
    }

    /// Apply finished text targets, if any. Returns true once they are applied.
    pub fn poll_text_targets(&mut self) -> bool {
        let Some(result) = self.text_task.as_mut().and_then(|task| task.poll()) else {
            return false;
        };
        self.text_task = None;
        self.apply_text_result(result)
    }

    /// Block until pending text sampling finishes (used by headless runs
    /// that want deterministic output).
    pub fn wait_for_text_targets(&mut self) -> bool {
        match self.text_task.take() {
            Some(task) => self.apply_text_result(task.wait()),
            None => false,
        }
    }

    fn apply_text_result(&mut self, result: Result<Vec<glimmer_core::Vec3>>) -> bool {
        let applied = result.and_then(|samples| {
            self.field.set_text_targets(&samples)?;
            Ok(samples.len())
        });
        match applied {
            Ok(count) => {
                log::info!("Text targets ready ({count} samples)");
                self.events.push(SceneEvent::TextTargetsReady { count });
                true
            }
            Err(e) => {
                log::warn!("Text targets unavailable, text formation stays scattered: {e}");
                self.events.push(SceneEvent::TextTargetsFailed(e.to_string()));
                false
            }
        }
    }

    /// Step every piece of the scene
    pub fn step(&mut self, ctx: &FrameContext, dt: f32) {
        self.poll_text_targets();
        let elapsed = ctx.elapsed as f32;
        self.field.advance(ctx.formation, ctx.interaction_point, dt);
        self.snow.advance(ctx.interaction_point, dt);
        self.stars.advance(ctx.pointer_ndc, dt);
        self.topper.advance(ctx.formation, elapsed, dt);
        self.cake.advance(ctx.formation, elapsed, dt);
    }

    pub fn formation_instances(&self) -> &[ParticleInstance] {
        self.field.instances()
    }

    pub fn snow_instances(&self) -> &[ParticleInstance] {
        self.snow.instances()
    }

    pub fn star_instances(&self) -> &[ParticleInstance] {
        self.stars.instances()
    }

    /// Whether the external camera controller should orbit
    pub fn camera_auto_rotates(formation: Formation) -> bool {
        formation.auto_rotates()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain()
    }
}

impl RuntimeSystem for ParticleSystem {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "Particle scene: {} formation particles, {} snowflakes, {} stars",
            self.field.len(),
            self.snow.len(),
            self.stars.len()
        );
        Ok(())
    }

    fn update(&mut self, ctx: &FrameContext, dt: f64) -> Result<()> {
        self.step(ctx, dt as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(task) = self.text_task.take() {
            log::debug!("Waiting for text sampling to finish");
            task.join();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}
