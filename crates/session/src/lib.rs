//! `aptitude-session`: one adaptive test as an event-sourced aggregate.
//!
//! The aggregate drives the scoring engine through the three phases and records
//! every decision as an event; [`StudentResultsProjection`] folds those events
//! into per-student read models.

pub mod projection;
pub mod session;

pub use projection::{CompletedSession, InProgressSession, StudentResultsProjection};
pub use session::{
    AbandonSession, AdaptiveSession, AnswerRecorded, PhaseAdvanced, SessionAbandoned, SessionCommand,
    SessionCompleted, SessionEvent, SessionStarted, SessionStatus, StartSession, SubmitAnswer, TierClassified,
    STREAM_TYPE,
};
