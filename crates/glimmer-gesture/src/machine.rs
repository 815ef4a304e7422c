//! Debounced formation state machine fed by per-frame gestures.
//!
//! Rules, applied once per classified frame:
//! - `Closed`: go to TREE and stop the open-hand timer.
//! - `NoHand`: stop the timer, keep the formation.
//! - `Open` with no timer: start it; only TREE moves (to SCATTERED).
//!   SCATTERED and TEXT stay where they are on this first open frame.
//! - `Open` with the timer running: past the hold time go to TEXT,
//!   otherwise SCATTERED unless already TEXT (never downgrades).
//! - `Indeterminate`: nothing changes.

use crate::recognizer::Gesture;
use glimmer_core::Formation;
use std::time::Duration;

/// A formation change produced by one update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Formation,
    pub to: Formation,
}

/// Pure transition function. Returns the next formation and timer start.
pub fn next_state(
    state: Formation,
    open_since: Option<Duration>,
    gesture: Gesture,
    now: Duration,
    hold: Duration,
) -> (Formation, Option<Duration>) {
    match gesture {
        Gesture::Closed => (Formation::Tree, None),
        Gesture::NoHand => (state, None),
        Gesture::Indeterminate => (state, open_since),
        Gesture::Open => match open_since {
            None => {
                let next = match state {
                    Formation::Tree => Formation::Scattered,
                    other => other,
                };
                (next, Some(now))
            }
            Some(start) => {
                let next = if now.saturating_sub(start) > hold {
                    Formation::Text
                } else if state == Formation::Text {
                    Formation::Text
                } else {
                    Formation::Scattered
                };
                (next, Some(start))
            }
        },
    }
}

#[derive(Clone, Debug)]
pub struct GestureStateMachine {
    state: Formation,
    open_since: Option<Duration>,
    hold: Duration,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000))
    }
}

impl GestureStateMachine {
    /// Starts in TREE with no timer running
    pub fn new(hold: Duration) -> Self {
        Self {
            state: Formation::Tree,
            open_since: None,
            hold,
        }
    }

    pub fn state(&self) -> Formation {
        self.state
    }

    pub fn open_since(&self) -> Option<Duration> {
        self.open_since
    }

    pub fn update(&mut self, gesture: Gesture, now: Duration) -> Option<Transition> {
        let (next, open_since) = next_state(self.state, self.open_since, gesture, now, self.hold);
        self.open_since = open_since;
        self.change_to(next)
    }

    /// Manual override. The open-hand timer is left alone.
    pub fn force(&mut self, formation: Formation) -> Option<Transition> {
        self.change_to(formation)
    }

    /// Manual toggle: TREE goes to SCATTERED, anything else back to TREE
    pub fn toggle(&mut self) -> Option<Transition> {
        self.change_to(self.state.toggled())
    }

    fn change_to(&mut self, next: Formation) -> Option<Transition> {
        if next == self.state {
            return None;
        }
        let from = std::mem::replace(&mut self.state, next);
        Some(Transition { from, to: next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn starts_in_tree() {
        let m = GestureStateMachine::default();
        assert_eq!(m.state(), Formation::Tree);
        assert_eq!(m.open_since(), None);
    }

    #[test]
    fn open_hold_then_fist() {
        let mut m = GestureStateMachine::default();
        assert_eq!(
            m.update(Gesture::Open, ms(0)),
            Some(Transition {
                from: Formation::Tree,
                to: Formation::Scattered
            })
        );
        let mut t = 0;
        while t < 5000 {
            t += 42;
            if t > 5000 {
                break;
            }
            m.update(Gesture::Open, ms(t));
            assert_eq!(m.state(), Formation::Scattered, "at {t} ms");
        }
        m.update(Gesture::Open, ms(5000));
        assert_eq!(m.state(), Formation::Scattered);
        assert_eq!(
            m.update(Gesture::Open, ms(5001)).map(|t| t.to),
            Some(Formation::Text)
        );
        assert_eq!(m.update(Gesture::Open, ms(6000)), None);

        assert_eq!(
            m.update(Gesture::Closed, ms(6042)).map(|t| t.to),
            Some(Formation::Tree)
        );
        assert_eq!(m.open_since(), None);
    }

    #[test]
    fn hand_lost_resets_timer() {
        let mut m = GestureStateMachine::default();
        m.update(Gesture::Open, ms(0));
        m.update(Gesture::Open, ms(3000));
        m.update(Gesture::NoHand, ms(3042));
        assert_eq!(m.state(), Formation::Scattered);
        assert_eq!(m.open_since(), None);
        // Timer restarts from here, so 5 s later is not yet past the hold
        m.update(Gesture::Open, ms(4000));
        m.update(Gesture::Open, ms(8000));
        assert_eq!(m.state(), Formation::Scattered);
        m.update(Gesture::Open, ms(9001));
        assert_eq!(m.state(), Formation::Text);
    }

    #[test]
    fn indeterminate_changes_nothing() {
        let mut m = GestureStateMachine::default();
        m.update(Gesture::Open, ms(0));
        assert_eq!(m.update(Gesture::Indeterminate, ms(100)), None);
        assert_eq!(m.open_since(), Some(ms(0)));
        // Timer kept running through the indeterminate frame
        m.update(Gesture::Open, ms(5100));
        assert_eq!(m.state(), Formation::Text);
    }

    #[test]
    fn first_open_frame_keeps_text() {
        let mut m = GestureStateMachine::default();
        m.force(Formation::Text);
        assert_eq!(m.update(Gesture::Open, ms(0)), None);
        assert_eq!(m.state(), Formation::Text);
        // Still under the hold: text is never downgraded
        assert_eq!(m.update(Gesture::Open, ms(100)), None);
        assert_eq!(m.state(), Formation::Text);
    }

    #[test]
    fn fist_from_any_state_goes_to_tree() {
        for start in Formation::ALL {
            let mut m = GestureStateMachine::default();
            m.force(start);
            m.update(Gesture::Closed, ms(10));
            assert_eq!(m.state(), Formation::Tree);
        }
    }

    #[test]
    fn toggle_and_force_leave_timer_alone() {
        let mut m = GestureStateMachine::default();
        m.update(Gesture::Open, ms(0));
        assert_eq!(m.toggle().map(|t| t.to), Some(Formation::Tree));
        assert_eq!(m.open_since(), Some(ms(0)));
        assert_eq!(m.toggle().map(|t| t.to), Some(Formation::Scattered));
        assert_eq!(m.force(Formation::Scattered), None);
        assert_eq!(m.open_since(), Some(ms(0)));
    }

    #[test]
    fn pure_function_matches_table() {
        let hold = ms(5000);
        let cases = [
            (Formation::Tree, None, Gesture::Open, Formation::Scattered),
            (Formation::Scattered, None, Gesture::Open, Formation::Scattered),
            (Formation::Text, None, Gesture::Open, Formation::Text),
            (Formation::Tree, Some(ms(0)), Gesture::Open, Formation::Scattered),
            (Formation::Text, Some(ms(0)), Gesture::Open, Formation::Text),
            (Formation::Text, Some(ms(0)), Gesture::NoHand, Formation::Text),
            (Formation::Scattered, Some(ms(0)), Gesture::Closed, Formation::Tree),
        ];
        for (state, since, gesture, expected) in cases {
            let (next, _) = next_state(state, since, gesture, ms(1000), hold);
            assert_eq!(next, expected, "{state:?} {since:?} {gesture:?}");
        }
    }
}
