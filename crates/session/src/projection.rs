use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aptitude_core::{SessionId, StudentId};
use aptitude_engine::{DifficultyLevel, TestPhase, TestResults};
use aptitude_events::{Event, EventEnvelope, Projection};

use crate::session::SessionEvent;

/// Read model: a session still being taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProgressSession {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub phase: TestPhase,
    pub questions_answered: usize,
    pub current_difficulty: DifficultyLevel,
    pub started_at: DateTime<Utc>,
}

/// Read model: a finished session and its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub results: TestResults,
    pub completed_at: DateTime<Utc>,
}

/// Per-student results built from session streams.
///
/// Tracks one cursor per session stream; envelopes at or below the cursor are
/// replays and are skipped.
#[derive(Debug, Clone, Default)]
pub struct StudentResultsProjection {
    cursors: HashMap<SessionId, u64>,
    students: HashMap<SessionId, StudentId>,
    in_progress: HashMap<StudentId, InProgressSession>,
    completed: HashMap<StudentId, Vec<CompletedSession>>,
}

impl StudentResultsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed sessions for a student, oldest first.
    pub fn completed_results(&self, student_id: StudentId) -> &[CompletedSession] {
        self.completed.get(&student_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest_result(&self, student_id: StudentId) -> Option<&CompletedSession> {
        self.completed_results(student_id).last()
    }

    /// The student's most recently started unfinished session.
    pub fn in_progress(&self, student_id: StudentId) -> Option<&InProgressSession> {
        self.in_progress.get(&student_id)
    }

    fn in_progress_for(&mut self, session_id: SessionId) -> Option<&mut InProgressSession> {
        let student_id = self.students.get(&session_id)?;
        self.in_progress
            .get_mut(student_id)
            .filter(|s| s.session_id == session_id)
    }

    fn finish(&mut self, session_id: SessionId, student_id: StudentId) {
        if self
            .in_progress
            .get(&student_id)
            .is_some_and(|s| s.session_id == session_id)
        {
            self.in_progress.remove(&student_id);
        }
    }
}

impl Projection for StudentResultsProjection {
    type Ev = SessionEvent;

    fn apply(&mut self, envelope: &EventEnvelope<SessionEvent>) {
        let session_id = envelope.session_id();
        let seq = envelope.sequence_number();
        let last = self.cursors.get(&session_id).copied().unwrap_or(0);

        if seq <= last {
            return;
        }
        if envelope.payload().session_id() != session_id {
            tracing::warn!(
                %session_id,
                event_type = envelope.payload().event_type(),
                "event does not belong to its envelope's stream; skipped"
            );
            return;
        }
        if last != 0 && seq != last + 1 {
            tracing::warn!(%session_id, last, found = seq, "gap in session stream");
        }
        self.cursors.insert(session_id, seq);

        match envelope.payload() {
            SessionEvent::SessionStarted(e) => {
                self.students.insert(e.session_id, e.student_id);
                self.in_progress.insert(
                    e.student_id,
                    InProgressSession {
                        session_id: e.session_id,
                        student_id: e.student_id,
                        phase: TestPhase::DiagnosticScreener,
                        questions_answered: 0,
                        current_difficulty: e.starting_difficulty,
                        started_at: e.occurred_at,
                    },
                );
            }
            SessionEvent::AnswerRecorded(e) => {
                if let Some(s) = self.in_progress_for(e.session_id) {
                    s.questions_answered += 1;
                    s.current_difficulty = e.next_difficulty;
                }
            }
            SessionEvent::PhaseAdvanced(e) => {
                if let Some(s) = self.in_progress_for(e.session_id) {
                    s.phase = e.to;
                    s.current_difficulty = e.starting_difficulty;
                }
            }
            SessionEvent::TierClassified(_) => {}
            SessionEvent::SessionCompleted(e) => {
                self.finish(e.session_id, e.student_id);
                self.completed.entry(e.student_id).or_default().push(CompletedSession {
                    session_id: e.session_id,
                    student_id: e.student_id,
                    results: e.results.clone(),
                    completed_at: e.occurred_at,
                });
            }
            SessionEvent::SessionAbandoned(e) => {
                self.finish(e.session_id, e.student_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionAbandoned, SessionStarted, STREAM_TYPE};
    use aptitude_engine::{AdaptiveTestConfig, GradeLevel};

    fn started(session_id: SessionId, student_id: StudentId) -> SessionEvent {
        SessionEvent::SessionStarted(SessionStarted {
            session_id,
            student_id,
            grade_level: GradeLevel::MiddleSchool,
            config: AdaptiveTestConfig::default(),
            starting_difficulty: DifficultyLevel::MIN,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn started_session_is_in_progress_until_abandoned() {
        let session_id = SessionId::new();
        let student_id = StudentId::new();
        let mut projection = StudentResultsProjection::new();

        let envelopes = EventEnvelope::wrap_all(
            session_id,
            STREAM_TYPE,
            0,
            [
                started(session_id, student_id),
                SessionEvent::SessionAbandoned(SessionAbandoned {
                    session_id,
                    student_id,
                    reason: "timeout".into(),
                    occurred_at: Utc::now(),
                }),
            ],
        );

        projection.apply(&envelopes[0]);
        let current = projection.in_progress(student_id).unwrap();
        assert_eq!(current.session_id, session_id);
        assert_eq!(current.phase, TestPhase::DiagnosticScreener);

        projection.apply(&envelopes[1]);
        assert!(projection.in_progress(student_id).is_none());
        assert!(projection.completed_results(student_id).is_empty());
    }

    #[test]
    fn replayed_envelopes_are_ignored() {
        let session_id = SessionId::new();
        let other_student = StudentId::new();
        let mut projection = StudentResultsProjection::new();

        let first = EventEnvelope::wrap_all(session_id, STREAM_TYPE, 0, [started(session_id, StudentId::new())]);
        projection.apply(&first[0]);

        // Same sequence number, different payload: must not overwrite.
        let replay = EventEnvelope::wrap_all(session_id, STREAM_TYPE, 0, [started(session_id, other_student)]);
        assert_eq!(replay[0].sequence_number(), 1);
        projection.apply(&replay[0]);
        assert!(projection.in_progress(other_student).is_none());
    }
}
