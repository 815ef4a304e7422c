//! Gesture controller: camera → landmarks → gesture → state machine →
//! shared formation.
//!
//! The controller is the only writer of the shared formation. Manual
//! overrides arrive through its command channel. It can be stepped from the
//! frame loop (`RuntimeSystem`) or moved onto its own thread with
//! [`GestureWorker`].

use crate::config::GestureConfig;
use crate::landmarks::HandLandmarks;
use crate::machine::{GestureStateMachine, Transition};
use crate::recognizer::{Gesture, GestureRecognizer};
use crate::source::{FrameSource, ModelSlot};
use glimmer_core::{Formation, GlimmerError, Result};
use glimmer_runtime::{
    EventBus, FormationReader, FormationWriter, FrameContext, MonotonicClock, RateGate,
    RuntimeSystem, SceneEvent,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Manual override requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormationCommand {
    Toggle,
    Set(Formation),
}

/// Cloneable handle for sending overrides to a controller
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: Sender<FormationCommand>,
}

impl CommandSender {
    /// Returns false once the controller is gone
    pub fn send(&self, command: FormationCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn toggle(&self) -> bool {
        self.send(FormationCommand::Toggle)
    }

    pub fn set(&self, formation: Formation) -> bool {
        self.send(FormationCommand::Set(formation))
    }
}

pub struct GestureController {
    recognizer: GestureRecognizer,
    machine: GestureStateMachine,
    gate: RateGate,
    last_frame: Option<Duration>,
    frames: Option<Box<dyn FrameSource>>,
    model: ModelSlot,
    writer: FormationWriter,
    commands: Receiver<FormationCommand>,
    command_tx: Sender<FormationCommand>,
    last_gesture: Option<Gesture>,
    events: EventBus,
}

impl GestureController {
    /// `frames` is the result of opening the camera. A failed camera leaves
    /// the controller running with every sample read as "no hand".
    pub fn new(
        config: &GestureConfig,
        writer: FormationWriter,
        frames: Result<Box<dyn FrameSource>>,
        model: ModelSlot,
    ) -> Result<Self> {
        config.validate()?;
        let (command_tx, commands) = mpsc::channel();
        let mut machine = GestureStateMachine::new(config.text_hold());
        // Start from whatever the shared cell holds
        machine.force(writer.get());

        let mut controller = Self {
            recognizer: GestureRecognizer::new(config),
            machine,
            gate: RateGate::new(config.sample_interval()),
            last_frame: None,
            frames: None,
            model,
            writer,
            commands,
            command_tx,
            last_gesture: None,
            events: EventBus::new(),
        };

        match frames {
            Ok(frames) => controller.frames = Some(frames),
            Err(e) => controller.input_lost(format!("camera unavailable: {e}")),
        }
        if let ModelSlot::Unavailable(reason) = &controller.model {
            let reason = format!("landmark model unavailable: {reason}");
            controller.input_lost(reason);
        }

        Ok(controller)
    }

    pub fn commands(&self) -> CommandSender {
        CommandSender {
            tx: self.command_tx.clone(),
        }
    }

    pub fn formation(&self) -> Formation {
        self.machine.state()
    }

    pub fn reader(&self) -> FormationReader {
        self.writer.reader()
    }

    pub fn machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    /// Gesture from the most recent sample
    pub fn last_gesture(&self) -> Option<Gesture> {
        self.last_gesture
    }

    pub fn input_available(&self) -> bool {
        self.frames.is_some() && !matches!(self.model, ModelSlot::Unavailable(_))
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain()
    }

    fn input_lost(&mut self, reason: String) {
        log::error!("Gesture input lost, falling back to manual control: {reason}");
        self.events.push(SceneEvent::GestureInputLost(reason));
    }

    fn publish(&mut self, transition: Transition, cause: &str) {
        self.writer.set(transition.to);
        log::info!(
            "Formation {} -> {} ({cause})",
            transition.from,
            transition.to
        );
        self.events.push(SceneEvent::FormationChanged {
            from: transition.from,
            to: transition.to,
        });
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            let transition = match command {
                FormationCommand::Toggle => self.machine.toggle(),
                FormationCommand::Set(formation) => self.machine.force(formation),
            };
            if let Some(t) = transition {
                self.publish(t, "manual");
            }
        }
    }

    /// Run one iteration at monotonic time `now`. Returns the gesture when
    /// a sample was taken, `None` when gated, deduplicated or still loading.
    pub fn step(&mut self, now: Duration) -> Option<Gesture> {
        self.apply_commands();
        if let Some(reason) = self.model.resolve() {
            self.input_lost(format!("landmark model failed to load: {reason}"));
        }
        if !self.gate.ready(now) {
            return None;
        }

        let gesture = self.sample(now)?;
        self.last_gesture = Some(gesture);
        if let Some(t) = self.machine.update(gesture, now) {
            self.publish(t, "gesture");
        }
        Some(gesture)
    }

    fn sample(&mut self, now: Duration) -> Option<Gesture> {
        if self.model.is_loading() {
            return None;
        }
        let (Some(frames), Some(model)) = (self.frames.as_mut(), self.model.model_mut()) else {
            return Some(Gesture::NoHand);
        };

        let frame = match frames.latest_frame(now) {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Frame capture failed: {e}");
                return Some(Gesture::NoHand);
            }
        };
        if self.last_frame == Some(frame.timestamp) {
            return None;
        }
        self.last_frame = Some(frame.timestamp);

        let hand = match model.detect(&frame, now) {
            Ok(Some(points)) => HandLandmarks::from_slice(&points),
            Ok(None) => return Some(Gesture::NoHand),
            Err(e) => Err(e),
        };
        match hand {
            Ok(hand) => Some(self.recognizer.classify(Some(&hand))),
            Err(e) => {
                log::warn!("Detection failed: {e}");
                Some(Gesture::NoHand)
            }
        }
    }

    fn release_input(&mut self) {
        if let Some(mut frames) = self.frames.take() {
            frames.release();
            log::debug!("Camera released");
        }
        self.model = ModelSlot::Unavailable("shut down".into());
    }
}

impl RuntimeSystem for GestureController {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "Gesture control starting in {} (input {})",
            self.formation(),
            if self.input_available() { "available" } else { "unavailable" }
        );
        Ok(())
    }

    fn update(&mut self, ctx: &FrameContext, _dt: f64) -> Result<()> {
        self.step(Duration::from_secs_f64(ctx.elapsed.max(0.0)));
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.release_input();
        Ok(())
    }

    fn name(&self) -> &str {
        "gesture"
    }
}

/// A controller running on its own thread against the monotonic clock
pub struct GestureWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<GestureController>>,
    events: Receiver<SceneEvent>,
    commands: CommandSender,
    reader: FormationReader,
}

impl GestureWorker {
    pub fn spawn(mut controller: GestureController) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let (event_tx, events) = mpsc::channel();
        let commands = controller.commands();
        let reader = controller.reader();
        let poll = (controller.gate.interval() / 4).max(Duration::from_millis(1));

        let flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("gesture".into())
            .spawn(move || run_worker(controller, &flag, &event_tx, poll))
            .map_err(|e| GlimmerError::RuntimeError(format!("failed to spawn gesture worker: {e}")))?;

        Ok(Self {
            stop,
            handle: Some(handle),
            events,
            commands,
            reader,
        })
    }

    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    pub fn reader(&self) -> FormationReader {
        self.reader.clone()
    }

    /// Events produced since the last call
    pub fn poll_events(&self) -> Vec<SceneEvent> {
        self.events.try_iter().collect()
    }

    /// Signal the worker, wait for it and hand back the controller with its
    /// input released.
    pub fn stop(mut self) -> Result<GestureController> {
        self.stop.store(true, Ordering::Release);
        let handle = self
            .handle
            .take()
            .ok_or_else(|| GlimmerError::RuntimeError("gesture worker already stopped".into()))?;
        handle
            .join()
            .map_err(|_| GlimmerError::RuntimeError("gesture worker panicked".into()))
    }
}

/// Worker body. Runs until `stop` is raised or nobody is listening for
/// events any more, then releases input and hands the controller back.
fn run_worker(
    mut controller: GestureController,
    stop: &AtomicBool,
    events: &Sender<SceneEvent>,
    poll: Duration,
) -> GestureController {
    let clock = MonotonicClock::new();
    'run: while !stop.load(Ordering::Acquire) {
        controller.step(clock.now());
        for event in controller.drain_events() {
            if events.send(event).is_err() {
                log::debug!("Gesture event receiver dropped, stopping worker");
                break 'run;
            }
        }
        std::thread::sleep(poll);
    }
    controller.release_input();
    controller
}

impl Drop for GestureWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
