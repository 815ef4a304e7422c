//! Shared formation cell - one writer, any number of readers.
//!
//! The render loop reads the formation every frame while the gesture side
//! (possibly on its own thread) decides it. A single atomic byte carries the
//! value so readers never observe a torn or half-applied change, and the
//! writer handle is not `Clone`.

use glimmer_core::Formation;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Create a formation cell holding `initial`.
pub fn formation_cell(initial: Formation) -> (FormationWriter, FormationReader) {
    let shared = Arc::new(AtomicU8::new(initial.as_u8()));
    (
        FormationWriter {
            shared: Arc::clone(&shared),
        },
        FormationReader { shared },
    )
}

/// The only handle allowed to change the shared formation
#[derive(Debug)]
pub struct FormationWriter {
    shared: Arc<AtomicU8>,
}

impl FormationWriter {
    /// Store a new formation, returning the previous one
    pub fn set(&self, formation: Formation) -> Formation {
        Formation::from_u8(self.shared.swap(formation.as_u8(), Ordering::AcqRel))
    }

    pub fn get(&self) -> Formation {
        Formation::from_u8(self.shared.load(Ordering::Acquire))
    }

    /// Hand out another read handle
    pub fn reader(&self) -> FormationReader {
        FormationReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only view of the shared formation
#[derive(Clone, Debug)]
pub struct FormationReader {
    shared: Arc<AtomicU8>,
}

impl FormationReader {
    pub fn get(&self) -> Formation {
        Formation::from_u8(self.shared.load(Ordering::Acquire))
    }
}
