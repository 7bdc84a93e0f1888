//! Outbound event bus. Everything published here is drained into the next snapshot.

use chroma_core::events::{AudioCue, DomainEvent, Feedback, RejectReason};
use chroma_core::types::TowerId;

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<DomainEvent>,
    audio: Vec<AudioCue>,
    feedback: Vec<Feedback>,
}

impl EventBus {
    pub fn publish(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.audio.push(cue);
    }

    /// Record a refused intent. Always returns `false` so callers can `return bus.reject(..)`.
    pub fn reject(&mut self, reason: RejectReason, tower: Option<TowerId>) -> bool {
        tracing::debug!(?reason, ?tower, "intent rejected");
        self.feedback.push(Feedback::Rejected { reason, tower });
        false
    }

    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> (Vec<DomainEvent>, Vec<AudioCue>, Vec<Feedback>) {
        (
            std::mem::take(&mut self.events),
            std::mem::take(&mut self.audio),
            std::mem::take(&mut self.feedback),
        )
    }
}
