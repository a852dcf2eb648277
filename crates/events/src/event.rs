use chrono::{DateTime, Utc};

use aptitude_core::SessionId;

/// A fact recorded on a session stream.
///
/// Events are append-only and never edited; a change of shape gets a new
/// `version()` so old streams still replay.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, e.g. `"assessment.session.answer_recorded"`.
    fn event_type(&self) -> &'static str;

    /// Schema version of this event type.
    fn version(&self) -> u32;

    /// Session stream the event belongs to.
    fn session_id(&self) -> SessionId;

    /// Business time of the fact (the moment the student acted).
    fn occurred_at(&self) -> DateTime<Utc>;
}
