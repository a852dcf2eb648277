use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use aptitude_core::{Aggregate, AggregateRoot, DomainError, ExpectedVersion, SessionId, StudentId};
use aptitude_engine::{
    adjust_difficulty, check_stop_conditions, classify_tier, plan_stability_confirmation, provisional_band,
    summarize_results, AdaptiveTestConfig, DifficultyLevel, GradeLevel, ItemSpec, Response, StopReason, Subtag,
    TestPhase, TestResults, Tier, TierClassification,
};
use aptitude_events::Event;

/// Stream type carried by every session envelope.
pub const STREAM_TYPE: &str = "adaptive_session";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

/// Aggregate root: AdaptiveSession.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveSession {
    id: SessionId,
    student_id: Option<StudentId>,
    grade_level: Option<GradeLevel>,
    config: AdaptiveTestConfig,
    status: SessionStatus,
    phase: TestPhase,
    current_difficulty: DifficultyLevel,
    responses: Vec<Response>,
    path: Vec<DifficultyLevel>,
    tier: Option<Tier>,
    provisional_band: Option<DifficultyLevel>,
    planned_stability_items: usize,
    results: Option<TestResults>,
    version: u64,
}

impl AdaptiveSession {
    /// Create an empty, not-yet-started aggregate instance for rehydration.
    pub fn empty(id: SessionId) -> Self {
        let config = AdaptiveTestConfig::default();
        Self {
            id,
            student_id: None,
            grade_level: None,
            current_difficulty: config.screener_starting_difficulty,
            config,
            status: SessionStatus::NotStarted,
            phase: TestPhase::DiagnosticScreener,
            responses: Vec::new(),
            path: Vec::new(),
            tier: None,
            provisional_band: None,
            planned_stability_items: 0,
            results: None,
            version: 0,
        }
    }

    /// Rebuild a session by replaying its stream.
    pub fn from_events<'a>(id: SessionId, events: impl IntoIterator<Item = &'a SessionEvent>) -> Self {
        Self::empty(id).replay(events)
    }

    pub fn student_id(&self) -> Option<StudentId> {
        self.student_id
    }

    pub fn grade_level(&self) -> Option<GradeLevel> {
        self.grade_level
    }

    pub fn config(&self) -> &AdaptiveTestConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    /// Difficulty of the next item to present.
    pub fn current_difficulty(&self) -> DifficultyLevel {
        self.current_difficulty
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn difficulty_path(&self) -> &[DifficultyLevel] {
        &self.path
    }

    pub fn questions_answered(&self) -> usize {
        self.responses.len()
    }

    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn provisional_band(&self) -> Option<DifficultyLevel> {
        self.provisional_band
    }

    /// Number of stability-confirmation items; 0 until that phase starts.
    pub fn planned_stability_items(&self) -> usize {
        self.planned_stability_items
    }

    pub fn results(&self) -> Option<&TestResults> {
        self.results.as_ref()
    }

    /// Plan the stability-confirmation items around this session's band.
    ///
    /// Empty unless the session is in the stability phase.
    pub fn plan_stability_items<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ItemSpec> {
        if self.status != SessionStatus::InProgress || self.phase != TestPhase::StabilityConfirmation {
            return Vec::new();
        }
        plan_stability_confirmation(self.current_difficulty, self.planned_stability_items, &self.config, rng)
    }

    fn answered_in(&self, phase: TestPhase) -> usize {
        self.responses.iter().filter(|r| r.phase == phase).count()
    }
}

impl AggregateRoot for AdaptiveSession {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: StartSession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSession {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub grade_level: GradeLevel,
    pub config: AdaptiveTestConfig,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitAnswer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswer {
    pub session_id: SessionId,
    pub question_id: String,
    pub subtag: Subtag,
    pub is_correct: bool,
    /// Difficulty of the item actually shown; defaults to the session's current difficulty.
    pub presented_difficulty: Option<DifficultyLevel>,
    pub expected_version: ExpectedVersion,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AbandonSession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbandonSession {
    pub session_id: SessionId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    StartSession(StartSession),
    SubmitAnswer(SubmitAnswer),
    AbandonSession(AbandonSession),
}

/// Event: SessionStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub grade_level: GradeLevel,
    pub config: AdaptiveTestConfig,
    pub starting_difficulty: DifficultyLevel,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AnswerRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecorded {
    pub session_id: SessionId,
    pub response: Response,
    /// Difficulty for the next item after this answer.
    pub next_difficulty: DifficultyLevel,
    pub provisional_band: Option<DifficultyLevel>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TierClassified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierClassified {
    pub session_id: SessionId,
    pub classification: TierClassification,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PhaseAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseAdvanced {
    pub session_id: SessionId,
    pub from: TestPhase,
    pub to: TestPhase,
    /// Difficulty the new phase starts at (the tier start, or the stability band).
    pub starting_difficulty: DifficultyLevel,
    /// Set when entering stability confirmation.
    pub planned_items: Option<usize>,
    pub stop_reason: Option<StopReason>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SessionCompleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCompleted {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub results: TestResults,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SessionAbandoned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAbandoned {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    SessionStarted(SessionStarted),
    AnswerRecorded(AnswerRecorded),
    TierClassified(TierClassified),
    PhaseAdvanced(PhaseAdvanced),
    SessionCompleted(SessionCompleted),
    SessionAbandoned(SessionAbandoned),
}

impl Event for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted(_) => "assessment.session.started",
            SessionEvent::AnswerRecorded(_) => "assessment.session.answer_recorded",
            SessionEvent::TierClassified(_) => "assessment.session.tier_classified",
            SessionEvent::PhaseAdvanced(_) => "assessment.session.phase_advanced",
            SessionEvent::SessionCompleted(_) => "assessment.session.completed",
            SessionEvent::SessionAbandoned(_) => "assessment.session.abandoned",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::SessionStarted(e) => e.session_id,
            SessionEvent::AnswerRecorded(e) => e.session_id,
            SessionEvent::TierClassified(e) => e.session_id,
            SessionEvent::PhaseAdvanced(e) => e.session_id,
            SessionEvent::SessionCompleted(e) => e.session_id,
            SessionEvent::SessionAbandoned(e) => e.session_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SessionEvent::SessionStarted(e) => e.occurred_at,
            SessionEvent::AnswerRecorded(e) => e.occurred_at,
            SessionEvent::TierClassified(e) => e.occurred_at,
            SessionEvent::PhaseAdvanced(e) => e.occurred_at,
            SessionEvent::SessionCompleted(e) => e.occurred_at,
            SessionEvent::SessionAbandoned(e) => e.occurred_at,
        }
    }
}

impl Aggregate for AdaptiveSession {
    type Command = SessionCommand;
    type Event = SessionEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SessionEvent::SessionStarted(e) => {
                self.id = e.session_id;
                self.student_id = Some(e.student_id);
                self.grade_level = Some(e.grade_level);
                self.config = e.config.clone();
                self.status = SessionStatus::InProgress;
                self.phase = TestPhase::DiagnosticScreener;
                self.current_difficulty = e.starting_difficulty;
            }
            SessionEvent::AnswerRecorded(e) => {
                self.path.push(e.response.difficulty_at_time);
                self.responses.push(e.response.clone());
                self.current_difficulty = e.next_difficulty;
                self.provisional_band = e.provisional_band;
            }
            SessionEvent::TierClassified(e) => {
                self.tier = Some(e.classification.tier);
            }
            SessionEvent::PhaseAdvanced(e) => {
                self.phase = e.to;
                self.current_difficulty = e.starting_difficulty;
                if let Some(planned) = e.planned_items {
                    self.planned_stability_items = planned;
                }
            }
            SessionEvent::SessionCompleted(e) => {
                self.status = SessionStatus::Completed;
                self.results = Some(e.results.clone());
            }
            SessionEvent::SessionAbandoned(_) => {
                self.status = SessionStatus::Abandoned;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SessionCommand::StartSession(cmd) => self.handle_start(cmd),
            SessionCommand::SubmitAnswer(cmd) => self.handle_submit(cmd),
            SessionCommand::AbandonSession(cmd) => self.handle_abandon(cmd),
        }
    }
}

impl AdaptiveSession {
    fn ensure_session_id(&self, session_id: SessionId) -> Result<(), DomainError> {
        if self.id != session_id {
            return Err(DomainError::invariant("session_id mismatch"));
        }
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), DomainError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::NotStarted => Err(DomainError::invariant("session has not started")),
            SessionStatus::Completed => Err(DomainError::invariant("session already completed")),
            SessionStatus::Abandoned => Err(DomainError::invariant("session was abandoned")),
        }
    }

    fn started_student(&self) -> Result<StudentId, DomainError> {
        self.student_id
            .ok_or_else(|| DomainError::invariant("session has no student"))
    }

    fn handle_start(&self, cmd: &StartSession) -> Result<Vec<SessionEvent>, DomainError> {
        if self.status != SessionStatus::NotStarted {
            return Err(DomainError::conflict("session already started"));
        }
        self.ensure_session_id(cmd.session_id)?;
        cmd.config.validate()?;

        Ok(vec![SessionEvent::SessionStarted(SessionStarted {
            session_id: cmd.session_id,
            student_id: cmd.student_id,
            grade_level: cmd.grade_level,
            config: cmd.config.clone(),
            starting_difficulty: cmd.config.screener_starting_difficulty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitAnswer) -> Result<Vec<SessionEvent>, DomainError> {
        self.ensure_in_progress()?;
        self.ensure_session_id(cmd.session_id)?;
        cmd.expected_version.check(self.version)?;

        if cmd.question_id.trim().is_empty() {
            return Err(DomainError::validation("question_id cannot be empty"));
        }
        if self.responses.iter().any(|r| r.question_id == cmd.question_id) {
            return Err(DomainError::conflict(format!(
                "question {} already answered",
                cmd.question_id
            )));
        }

        let config = &self.config;
        let difficulty = cmd.presented_difficulty.unwrap_or(self.current_difficulty);
        let response = Response::new(cmd.question_id.clone(), self.phase, cmd.is_correct, difficulty, cmd.subtag);

        let mut responses = self.responses.clone();
        responses.push(response.clone());
        let mut path = self.path.clone();
        path.push(difficulty);
        let total = responses.len();

        let next_difficulty = match self.phase {
            TestPhase::StabilityConfirmation => self.current_difficulty,
            _ => adjust_difficulty(difficulty, cmd.is_correct).new_difficulty,
        };
        let band = match self.phase {
            TestPhase::AdaptiveCore => provisional_band(&path).or(self.provisional_band),
            _ => self.provisional_band,
        };

        let mut events = vec![SessionEvent::AnswerRecorded(AnswerRecorded {
            session_id: self.id,
            response,
            next_difficulty,
            provisional_band: band,
            occurred_at: cmd.occurred_at,
        })];

        if total >= config.max_total_questions() {
            tracing::info!(session_id = %self.id, total, "question ceiling reached");
            events.push(self.completed(&responses, &path, self.tier, cmd.occurred_at)?);
            return Ok(events);
        }

        match self.phase {
            TestPhase::DiagnosticScreener => {
                let answered = self.answered_in(TestPhase::DiagnosticScreener) + 1;
                if answered >= config.phases.diagnostic_screener.min_questions {
                    let classification = classify_tier(&responses, config);
                    let starting_difficulty = classification.starting_difficulty;
                    tracing::info!(
                        session_id = %self.id,
                        tier = ?classification.tier,
                        starting_difficulty = starting_difficulty.get(),
                        "screener complete"
                    );
                    let tier = classification.tier;
                    events.push(SessionEvent::TierClassified(TierClassified {
                        session_id: self.id,
                        classification,
                        occurred_at: cmd.occurred_at,
                    }));
                    events.push(SessionEvent::PhaseAdvanced(PhaseAdvanced {
                        session_id: self.id,
                        from: TestPhase::DiagnosticScreener,
                        to: TestPhase::AdaptiveCore,
                        starting_difficulty,
                        planned_items: None,
                        stop_reason: None,
                        occurred_at: cmd.occurred_at,
                    }));
                    tracing::debug!(session_id = %self.id, ?tier, "entered adaptive core");
                }
            }
            TestPhase::AdaptiveCore => {
                let answered = self.answered_in(TestPhase::AdaptiveCore) + 1;
                let stop = check_stop_conditions(total, &path, &responses, config);
                if stop.should_stop || answered >= config.phases.adaptive_core.max_questions {
                    let starting_difficulty = band.unwrap_or(next_difficulty);
                    let planned = config.stability_items();
                    tracing::info!(
                        session_id = %self.id,
                        reason = ?stop.reason,
                        band = starting_difficulty.get(),
                        planned,
                        "adaptive core complete"
                    );
                    events.push(SessionEvent::PhaseAdvanced(PhaseAdvanced {
                        session_id: self.id,
                        from: TestPhase::AdaptiveCore,
                        to: TestPhase::StabilityConfirmation,
                        starting_difficulty,
                        planned_items: Some(planned),
                        stop_reason: stop.reason,
                        occurred_at: cmd.occurred_at,
                    }));
                }
            }
            TestPhase::StabilityConfirmation => {
                let answered = self.answered_in(TestPhase::StabilityConfirmation) + 1;
                if answered >= self.planned_stability_items {
                    events.push(self.completed(&responses, &path, self.tier, cmd.occurred_at)?);
                }
            }
        }

        Ok(events)
    }

    fn handle_abandon(&self, cmd: &AbandonSession) -> Result<Vec<SessionEvent>, DomainError> {
        self.ensure_in_progress()?;
        self.ensure_session_id(cmd.session_id)?;

        Ok(vec![SessionEvent::SessionAbandoned(SessionAbandoned {
            session_id: self.id,
            student_id: self.started_student()?,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn completed(
        &self,
        responses: &[Response],
        path: &[DifficultyLevel],
        tier: Option<Tier>,
        occurred_at: DateTime<Utc>,
    ) -> Result<SessionEvent, DomainError> {
        let results = summarize_results(responses, path, tier, &self.config);
        tracing::info!(
            session_id = %self.id,
            aptitude_level = results.aptitude_level.map(DifficultyLevel::get),
            confidence = ?results.confidence_tag,
            total_questions = results.total_questions,
            "session completed"
        );
        Ok(SessionEvent::SessionCompleted(SessionCompleted {
            session_id: self.id,
            student_id: self.started_student()?,
            results,
            occurred_at,
        }))
    }
}
