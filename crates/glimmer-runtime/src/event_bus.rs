//! Queue of scene events between systems and the host loop

use crate::event::SceneEvent;

/// Systems queue events during a frame; the host drains them once per frame
pub struct EventBus {
    events: Vec<SceneEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::Formation;

    #[test]
    fn drain_returns_events_in_order() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.push(SceneEvent::FormationChanged {
            from: Formation::Tree,
            to: Formation::Scattered,
        });
        bus.push(SceneEvent::TextTargetsReady { count: 4000 });

        assert_eq!(bus.len(), 2);
        assert!(!bus.is_empty());

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                SceneEvent::FormationChanged {
                    from: Formation::Tree,
                    to: Formation::Scattered,
                },
                SceneEvent::TextTargetsReady { count: 4000 },
            ]
        );
        assert!(bus.is_empty());
    }
}
