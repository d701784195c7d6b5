//! Event emitter that stamps sequence numbers.
//!
//! Concurrent research tasks publish from several futures at once, so
//! broadcast order alone cannot be trusted. Observers order by `sequence`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use debate_core::{Side, SimulationStep};
use events::{Event, EventBus, EventEnvelope};
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderedEventEmitter {
    bus: EventBus,
    sequence: Arc<AtomicU64>,
}

impl OrderedEventEmitter {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish `event` with the next sequence number, starting at 1.
    pub fn emit(&self, event: Event) -> u64 {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.bus.publish(EventEnvelope::new(event).with_sequence(seq));
        seq
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    pub fn phase_changed(&self, run_id: Uuid, from: SimulationStep, to: SimulationStep) {
        self.emit(Event::PhaseChanged {
            run_id,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn typing(&self, run_id: Uuid, side: Option<Side>, active: bool) {
        self.emit(Event::Typing {
            run_id,
            side: side.map(|s| s.to_string()),
            active,
        });
    }

    pub fn revealed(&self, run_id: Uuid, phase: SimulationStep, unit: impl Into<String>) {
        self.emit(Event::Revealed {
            run_id,
            phase: phase.to_string(),
            unit: unit.into(),
        });
    }
}

impl Default for OrderedEventEmitter {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_envelopes_carry_increasing_sequence() {
        let emitter = OrderedEventEmitter::default();
        let mut rx = emitter.subscribe();
        let run_id = Uuid::new_v4();

        emitter.phase_changed(run_id, SimulationStep::Idle, SimulationStep::Framing);
        emitter.typing(run_id, Some(Side::Pro), true);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(matches!(
            second.event,
            Event::Typing { side: Some(ref s), active: true, .. } if s == "pro"
        ));
    }

    #[test]
    fn test_clone_shares_sequence() {
        let emitter1 = OrderedEventEmitter::default();
        let emitter2 = emitter1.clone();
        let run_id = Uuid::new_v4();

        assert_eq!(emitter1.emit(Event::SimulationReset { run_id }), 1);
        assert_eq!(emitter2.emit(Event::SimulationReset { run_id }), 2);
        assert_eq!(emitter1.emit(Event::SimulationReset { run_id }), 3);
    }
}
