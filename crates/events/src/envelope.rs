use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aptitude_core::SessionId;

/// Envelope for an event, carrying stream metadata.
///
/// One test session is one stream; `sequence_number` is monotonically increasing
/// within it (1 for the first event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    session_id: SessionId,
    stream_type: String,

    /// Position in the session stream.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        session_id: SessionId,
        stream_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            session_id,
            stream_type: stream_type.into(),
            sequence_number,
            payload,
        }
    }

    /// Wrap a batch of freshly decided events, numbering them after `last_sequence`.
    pub fn wrap_all(
        session_id: SessionId,
        stream_type: &str,
        last_sequence: u64,
        events: impl IntoIterator<Item = E>,
    ) -> Vec<Self> {
        events
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                Self::new(
                    Uuid::now_v7(),
                    session_id,
                    stream_type,
                    last_sequence + i as u64 + 1,
                    payload,
                )
            })
            .collect()
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn stream_type(&self) -> &str {
        &self.stream_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_all_numbers_events_after_the_last_sequence() {
        let session_id = SessionId::new();
        let wrapped = EventEnvelope::wrap_all(session_id, "adaptive_session", 4, ["a", "b", "c"]);

        let seqs: Vec<u64> = wrapped.iter().map(|e| e.sequence_number()).collect();
        assert_eq!(seqs, vec![5, 6, 7]);
        assert!(wrapped.iter().all(|e| e.session_id() == session_id));
        assert_eq!(*wrapped[1].payload(), "b");
    }
}
