use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only event stream.
///
/// Read models are disposable: they can be dropped and rebuilt by replaying the
/// session streams. Storage of the read model is the caller's concern.
pub trait Projection {
    type Ev: Event;

    /// Apply a single event to the projection, updating the read model.
    ///
    /// Must be **idempotent**: a replayed envelope (same session, already seen
    /// sequence number) leaves the read model unchanged. Events irrelevant to the
    /// projection are ignored.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
