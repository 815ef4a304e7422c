//! Seams to the outside world: camera frames and the landmark model.
//!
//! Both are external collaborators. The model is usually slow to load, so it
//! can be built on a background thread and picked up once ready.

use glimmer_core::{GlimmerError, Result, Vec3};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

/// One captured video frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoFrame {
    /// Capture time on the device clock. Equal timestamps mean the same frame.
    pub timestamp: Duration,
    pub width: u32,
    pub height: u32,
    /// Packed RGB8, may be empty for sources that do not carry pixels
    pub pixels: Vec<u8>,
}

/// A camera or any other producer of frames
pub trait FrameSource: Send {
    /// Most recent frame available at `now`, `None` if nothing is ready yet
    fn latest_frame(&mut self, now: Duration) -> Result<Option<VideoFrame>>;

    /// Stop capture and free the device
    fn release(&mut self) {}
}

/// Hand landmark detector
pub trait LandmarkModel: Send {
    /// Points of the first detected hand, `None` when no hand is visible
    fn detect(&mut self, frame: &VideoFrame, now: Duration) -> Result<Option<Vec<Vec3>>>;
}

/// Landmark model that may still be loading or may have failed to load
pub enum ModelSlot {
    Loading(Receiver<Result<Box<dyn LandmarkModel>>>),
    Ready(Box<dyn LandmarkModel>),
    Unavailable(String),
}

impl ModelSlot {
    pub fn ready<M: LandmarkModel + 'static>(model: M) -> Self {
        ModelSlot::Ready(Box::new(model))
    }

    /// Run `load` on its own thread
    pub fn spawn_loader<F>(load: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn LandmarkModel>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("landmark-model".into())
            .spawn(move || {
                let _ = tx.send(load());
            });
        match spawned {
            Ok(_) => ModelSlot::Loading(rx),
            Err(e) => ModelSlot::Unavailable(format!("failed to spawn model loader: {e}")),
        }
    }

    /// Advance a pending load. Returns the failure reason the one time
    /// loading turns out to have failed.
    pub fn resolve(&mut self) -> Option<String> {
        let ModelSlot::Loading(rx) = self else {
            return None;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(GlimmerError::ModelError(
                "model loader exited without a result".into(),
            )),
        };
        match outcome {
            Ok(model) => {
                log::info!("Landmark model ready");
                *self = ModelSlot::Ready(model);
                None
            }
            Err(e) => {
                let reason = e.to_string();
                *self = ModelSlot::Unavailable(reason.clone());
                Some(reason)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ModelSlot::Loading(_))
    }

    pub fn model_mut(&mut self) -> Option<&mut (dyn LandmarkModel + 'static)> {
        match self {
            ModelSlot::Ready(model) => Some(model.as_mut()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoHands;

    impl LandmarkModel for NoHands {
        fn detect(&mut self, _frame: &VideoFrame, _now: Duration) -> Result<Option<Vec<Vec3>>> {
            Ok(None)
        }
    }

    fn resolve_blocking(slot: &mut ModelSlot) -> Option<String> {
        for _ in 0..1000 {
            if !slot.is_loading() {
                return None;
            }
            if let Some(reason) = slot.resolve() {
                return Some(reason);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        None
    }

    #[test]
    fn background_load_becomes_ready() {
        let mut slot = ModelSlot::spawn_loader(|| Ok(Box::new(NoHands) as Box<dyn LandmarkModel>));
        assert_eq!(resolve_blocking(&mut slot), None);
        let model = slot.model_mut().unwrap();
        assert_eq!(model.detect(&VideoFrame::default(), Duration::ZERO).unwrap(), None);
    }

    #[test]
    fn failed_load_reports_once() {
        let mut slot =
            ModelSlot::spawn_loader(|| Err(GlimmerError::ModelError("weights missing".into())));
        let reason = resolve_blocking(&mut slot).unwrap();
        assert!(reason.contains("weights missing"));
        assert!(slot.model_mut().is_none());
        assert_eq!(slot.resolve(), None);
    }
}
