//! Text formation targets.
//!
//! Two labels are meshed, centered and sampled by surface area. The first
//! `primary_fraction` of the particles go to the primary label and the rest
//! to the secondary one, each band shifted vertically so they stack.
//! Sampling can run on a worker thread so the frame loop never waits on it.

use crate::config::TextLayoutConfig;
use crate::rand::ParticleRng;
use crate::sampler::{MeshSampler, TriangleMesh};
use glimmer_core::{GlimmerError, Result, Vec3};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

/// Turns a string into a surface mesh (extruded glyphs)
pub trait TextMeshSource: Send {
    fn mesh_for(&self, text: &str, size: f32) -> Result<TriangleMesh>;
}

fn centered_sampler(
    source: &dyn TextMeshSource,
    text: &str,
    size: f32,
) -> Result<MeshSampler> {
    let mut mesh = source.mesh_for(text, size)?;
    mesh.center();
    MeshSampler::new(&mesh).map_err(|e| {
        GlimmerError::SamplingError(format!("text {text:?}: {e}"))
    })
}

/// Number of particles assigned to the primary label
pub fn primary_share(count: usize, fraction: f32) -> usize {
    ((count as f32 * fraction).floor() as usize).min(count)
}

/// Sample `count` text targets, one per particle in id order
pub fn sample_text_targets(
    source: &dyn TextMeshSource,
    layout: &TextLayoutConfig,
    count: usize,
    rng: &mut ParticleRng,
) -> Result<Vec<Vec3>> {
    let split = primary_share(count, layout.primary_fraction);

    // A label with no particles never needs a mesh
    let primary = if split > 0 {
        Some(centered_sampler(source, &layout.primary_text, layout.primary_size)?)
    } else {
        None
    };
    let secondary = if split < count {
        Some(centered_sampler(source, &layout.secondary_text, layout.secondary_size)?)
    } else {
        None
    };

    let half_jitter = layout.jitter * 0.5;
    let mut targets = Vec::with_capacity(count);
    for i in 0..count {
        let (sampler, offset_y) = if i < split {
            (primary.as_ref(), layout.primary_offset_y)
        } else {
            (secondary.as_ref(), layout.secondary_offset_y)
        };
        let Some(sampler) = sampler else {
            return Err(GlimmerError::SamplingError("text band has no sampler".into()));
        };
        let mut p = sampler.sample(rng);
        p.y += offset_y;
        p += Vec3::new(
            rng.centered(half_jitter),
            rng.centered(half_jitter),
            rng.centered(half_jitter),
        );
        p.y += layout.lift_y;
        targets.push(p);
    }

    Ok(targets)
}

/// Text sampling running on a background thread
pub struct TextTargetsTask {
    receiver: Receiver<Result<Vec<Vec3>>>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl TextTargetsTask {
    pub fn spawn<S>(source: S, layout: TextLayoutConfig, count: usize, seed: u32) -> Self
    where
        S: TextMeshSource + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("text-targets".into())
            .spawn(move || {
                let mut rng = ParticleRng::new(seed);
                let result = sample_text_targets(&source, &layout, count, &mut rng);
                // Receiver gone means the scene was dropped; nothing to report
                let _ = tx.send(result);
            });

        match handle {
            Ok(handle) => Self {
                receiver: rx,
                handle: Some(handle),
                finished: false,
            },
            Err(e) => {
                // Thread creation failed: report through the same channel
                let (tx, rx) = mpsc::channel();
                let _ = tx.send(Err(GlimmerError::RuntimeError(format!(
                    "failed to spawn text sampling thread: {e}"
                ))));
                Self {
                    receiver: rx,
                    handle: None,
                    finished: false,
                }
            }
        }
    }

    /// Non-blocking check. Yields the result exactly once.
    pub fn poll(&mut self) -> Option<Result<Vec<Vec3>>> {
        if self.finished {
            return None;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(GlimmerError::RuntimeError(
                "text sampling thread exited without a result".into(),
            )),
        };
        self.finished = true;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        Some(result)
    }

    /// Block until the worker reports
    pub fn wait(mut self) -> Result<Vec<Vec3>> {
        if self.finished {
            return Err(GlimmerError::RuntimeError(
                "text sampling result already taken".into(),
            ));
        }
        let result = self.receiver.recv().unwrap_or_else(|_| {
            Err(GlimmerError::RuntimeError(
                "text sampling thread exited without a result".into(),
            ))
        });
        self.finished = true;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the worker to exit and discard whatever it produced.
    /// Sampling cannot be interrupted, so this blocks until it is done.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Text sampling thread panicked");
            }
        }
    }
}
