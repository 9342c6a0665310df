use std::fmt;

use serde::Serialize;
use skyroof_telemetry::{MotionState, RoofTelemetry};

/// A terminal motion transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeEvent {
    /// Roof reached fully raised.
    Raised,
    /// Roof reached fully lowered.
    Lowered,
    /// Lock reached engaged.
    Locked,
    /// Lock reached retracted.
    Unlocked,
}

impl EdgeEvent {
    pub const ALL: [EdgeEvent; 4] = [
        EdgeEvent::Raised,
        EdgeEvent::Lowered,
        EdgeEvent::Locked,
        EdgeEvent::Unlocked,
    ];
}

impl fmt::Display for EdgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeEvent::Raised => "raised",
            EdgeEvent::Lowered => "lowered",
            EdgeEvent::Locked => "locked",
            EdgeEvent::Unlocked => "unlocked",
        })
    }
}

/// The two motion channels edge detection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MotionSnapshot {
    pub roof: MotionState,
    pub lock: MotionState,
}

impl From<RoofTelemetry> for MotionSnapshot {
    fn from(t: RoofTelemetry) -> Self {
        Self {
            roof: t.roof_state,
            lock: t.lock_state,
        }
    }
}

impl From<&RoofTelemetry> for MotionSnapshot {
    fn from(t: &RoofTelemetry) -> Self {
        Self::from(*t)
    }
}

/// Events implied by moving from `prev` to `next`, roof before lock.
pub fn detect(prev: MotionSnapshot, next: MotionSnapshot) -> Vec<EdgeEvent> {
    let mut events = Vec::new();
    if let Some(event) = entered(prev.roof, next.roof, EdgeEvent::Raised, EdgeEvent::Lowered) {
        events.push(event);
    }
    if let Some(event) = entered(prev.lock, next.lock, EdgeEvent::Locked, EdgeEvent::Unlocked) {
        events.push(event);
    }
    events
}

fn entered(
    prev: MotionState,
    next: MotionState,
    on_raised: EdgeEvent,
    on_lowered: EdgeEvent,
) -> Option<EdgeEvent> {
    if prev == next {
        return None;
    }
    match next {
        MotionState::Raised => Some(on_raised),
        MotionState::Lowered => Some(on_lowered),
        _ => None,
    }
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Listener = Box<dyn FnMut(EdgeEvent) + Send>;

/// Detects terminal transitions and dispatches them to listeners.
///
/// Registration is additive. Listeners run synchronously in registration
/// order on the call that observed the transition.
#[derive(Default)]
pub struct EdgeDetector {
    listeners: Vec<(ListenerHandle, EdgeEvent, Listener)>,
    next_id: u64,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `listener` every time `kind` fires.
    pub fn register<F>(&mut self, kind: EdgeEvent, listener: F) -> ListenerHandle
    where
        F: FnMut(EdgeEvent) + Send + 'static,
    {
        let handle = ListenerHandle(self.next_id);
        self.next_id += 1;
        self.listeners.push((handle, kind, Box::new(listener)));
        handle
    }

    /// Compare two snapshots and dispatch whatever fired.
    pub fn observe(
        &mut self,
        prev: impl Into<MotionSnapshot>,
        next: impl Into<MotionSnapshot>,
    ) -> Vec<EdgeEvent> {
        let events = detect(prev.into(), next.into());
        for &event in &events {
            self.dispatch(event);
        }
        events
    }

    /// Invoke every listener registered for `event`.
    pub fn dispatch(&mut self, event: EdgeEvent) {
        for (_, kind, listener) in &mut self.listeners {
            if *kind == event {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EdgeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeDetector")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use skyroof_telemetry::MotionState::*;

    fn roof(state: MotionState) -> MotionSnapshot {
        MotionSnapshot {
            roof: state,
            lock: Unknown,
        }
    }

    #[test]
    fn roof_sequence_fires_each_terminal_once() {
        let sequence = [Unknown, Raising, Raised, Raised, Lowering, Lowered];
        let mut detector = EdgeDetector::new();
        let mut fired = Vec::new();
        for pair in sequence.windows(2) {
            fired.extend(detector.observe(roof(pair[0]), roof(pair[1])));
        }
        assert_eq!(fired, vec![EdgeEvent::Raised, EdgeEvent::Lowered]);
    }

    #[test]
    fn lock_transitions() {
        let prev = MotionSnapshot {
            roof: Lowered,
            lock: Raising,
        };
        let next = MotionSnapshot {
            roof: Lowered,
            lock: Raised,
        };
        assert_eq!(detect(prev, next), vec![EdgeEvent::Locked]);
        assert_eq!(detect(next, prev), Vec::<EdgeEvent>::new());

        let retracted = MotionSnapshot {
            roof: Lowered,
            lock: Lowered,
        };
        assert_eq!(detect(next, retracted), vec![EdgeEvent::Unlocked]);
    }

    #[test]
    fn direct_terminal_to_terminal_fires() {
        assert_eq!(detect(roof(Raised), roof(Lowered)), vec![EdgeEvent::Lowered]);
    }

    #[test]
    fn roof_and_lock_in_one_step() {
        let prev = MotionSnapshot::default();
        let next = MotionSnapshot {
            roof: Raised,
            lock: Lowered,
        };
        assert_eq!(detect(prev, next), vec![EdgeEvent::Raised, EdgeEvent::Unlocked]);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut detector = EdgeDetector::new();

        let first = Arc::clone(&log);
        let a = detector.register(EdgeEvent::Raised, move |e| {
            first.lock().unwrap().push(("a", e));
        });
        let second = Arc::clone(&log);
        let b = detector.register(EdgeEvent::Raised, move |e| {
            second.lock().unwrap().push(("b", e));
        });
        let other = Arc::clone(&log);
        detector.register(EdgeEvent::Lowered, move |e| {
            other.lock().unwrap().push(("c", e));
        });

        assert_ne!(a, b);
        assert_eq!(detector.listener_count(), 3);

        detector.observe(roof(Raising), roof(Raised));
        assert_eq!(
            *log.lock().unwrap(),
            vec![("a", EdgeEvent::Raised), ("b", EdgeEvent::Raised)]
        );
    }

    #[test]
    fn observe_accepts_roof_telemetry() {
        let prev = RoofTelemetry {
            roof_state: Lowering,
            ..RoofTelemetry::default()
        };
        let next = RoofTelemetry {
            roof_state: Lowered,
            ..prev
        };
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.observe(&prev, &next), vec![EdgeEvent::Lowered]);
        assert!(detector.observe(&next, &next).is_empty());
    }
}
