use std::fmt;

use crate::model::{Answer, ChoiceId, Question, SessionId, TestResults, UserContext, UserId};
use crate::session::effect::{
    SessionCommand, SessionEffect, StartOutcome, SubmitOutcome, SubmitRequest,
};
use crate::session::error::{Operation, ProtocolError, SessionError};
use crate::session::progress::SessionProgress;
use crate::session::snapshot::{SessionSnapshot, TimerView};
use crate::timer::{Timer, TimerConfig, TimerEvent};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of an adaptive test attempt.
///
/// `Starting` and `Submitting` are in-flight phases: a request is outstanding
/// and every other intent is rejected until it completes or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Answering,
    Submitting,
    Finished,
}

impl SessionPhase {
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, SessionPhase::Starting | SessionPhase::Submitting)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Starting => "starting",
            SessionPhase::Answering => "answering",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Server-side attempt as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: SessionId,
    user_id: UserId,
    total_questions: u32,
    history: Vec<Answer>,
    current_question: Option<Question>,
    is_finished: bool,
}

impl Session {
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn answered_count(&self) -> u32 {
        u32::try_from(self.history.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Submitted answers, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Answer] {
        &self.history
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }
}

/// Answer awaiting the server's verdict, plus the question it answers so a
/// failed submit can put it back on screen.
#[derive(Debug, Clone)]
struct InFlightAnswer {
    question: Question,
    answer: Answer,
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// Client-side adaptive test state machine.
///
/// Pure: it never performs I/O. Every transition returns the effects the
/// caller must carry out, including the requests to send. Completions are fed
/// back as `SessionCommand::StartSucceeded` / `SubmitFailed` and so on.
#[derive(Debug)]
pub struct AdaptiveSession {
    phase: SessionPhase,
    timer: Timer,
    context: Option<UserContext>,
    session: Option<Session>,
    selection: Option<ChoiceId>,
    in_flight: Option<InFlightAnswer>,
    results: Option<TestResults>,
    last_error: Option<String>,
}

impl AdaptiveSession {
    #[must_use]
    pub fn new(timer_config: TimerConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            timer: Timer::new(timer_config),
            context: None,
            session: None,
            selection: None,
            in_flight: None,
            results: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn context(&self) -> Option<&UserContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Non-null only while `Answering`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.phase != SessionPhase::Answering {
            return None;
        }
        self.session.as_ref().and_then(Session::current_question)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&ChoiceId> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn results(&self) -> Option<&TestResults> {
        self.results.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.as_ref().map_or_else(SessionProgress::default, |s| {
            SessionProgress::new(s.total_questions, s.answered_count(), s.is_finished)
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            phase: self.phase,
            session_id: self.session.as_ref().map(Session::session_id),
            progress: self.progress(),
            current_question: self.current_question(),
            selection: self.selection.as_ref(),
            timer: TimerView::of(&self.timer),
            history: self.session.as_ref().map(Session::history).unwrap_or_default(),
            results: self.results.as_ref(),
            last_error: self.last_error.as_deref(),
        }
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` when the command does not fit the
    /// current phase; state is left untouched. Returns `SessionError::Protocol`
    /// when a server reply breaks the protocol; the machine has then rolled back
    /// to the last stable phase.
    pub fn handle(&mut self, command: SessionCommand) -> Result<Vec<SessionEffect>, SessionError> {
        match command {
            SessionCommand::Start(context) => self.begin_start(context),
            SessionCommand::StartSucceeded(outcome) => self.complete_start(outcome),
            SessionCommand::StartFailed(message) => self.fail_start(message),
            SessionCommand::Select(choice) => self.select(choice),
            SessionCommand::Submit(value) => self.begin_submit(value),
            SessionCommand::SubmitSucceeded(outcome) => self.complete_submit(outcome),
            SessionCommand::SubmitFailed(message) => self.fail_submit(message),
            SessionCommand::Tick => Ok(self.tick()),
            SessionCommand::Reset => self.reset(),
        }
    }

    /// `Idle | Finished → Starting`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while a session is starting or active.
    pub fn begin_start(&mut self, context: UserContext) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::Start, &[SessionPhase::Idle, SessionPhase::Finished])?;

        self.clear();
        self.context = Some(context.clone());
        self.phase = SessionPhase::Starting;
        Ok(vec![SessionEffect::Render, SessionEffect::RequestStart(context)])
    }

    /// `Starting → Answering`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Starting`, or
    /// `SessionError::Protocol` (after rolling back to `Idle`) when the reply
    /// has no usable first question.
    pub fn complete_start(&mut self, outcome: StartOutcome) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::CompleteStart, &[SessionPhase::Starting])?;

        let user_id = match self.context.as_ref() {
            Some(context) => context.user_id.clone(),
            None => return Err(self.invalid(Operation::CompleteStart)),
        };
        if outcome.total_questions == 0 {
            return Err(self.rollback_start(ProtocolError::EmptySession));
        }
        let Some(first_question) = outcome.first_question else {
            return Err(self.rollback_start(ProtocolError::MissingFirstQuestion));
        };

        self.session = Some(Session {
            session_id: outcome.session_id,
            user_id,
            total_questions: outcome.total_questions,
            history: Vec::new(),
            current_question: Some(first_question),
            is_finished: false,
        });
        self.phase = SessionPhase::Answering;

        let duration_secs = self.timer.config().duration_secs;
        self.timer.start(duration_secs);
        Ok(vec![
            SessionEffect::StartTimer { duration_secs },
            SessionEffect::Render,
        ])
    }

    /// `Starting → Idle` after a failed start request.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Starting`.
    pub fn fail_start(&mut self, message: String) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::FailStart, &[SessionPhase::Starting])?;

        self.context = None;
        self.phase = SessionPhase::Idle;
        self.last_error = Some(message.clone());
        Ok(vec![SessionEffect::ShowError(message), SessionEffect::Render])
    }

    /// Record the pending choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Answering` and
    /// `SessionError::UnknownChoice` for a choice the question does not offer.
    pub fn select(&mut self, choice: ChoiceId) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::Select, &[SessionPhase::Answering])?;

        let offered = self
            .current_question()
            .is_some_and(|question| question.choice(&choice).is_some());
        if !offered {
            return Err(SessionError::UnknownChoice(choice));
        }

        self.selection = Some(choice);
        Ok(vec![SessionEffect::Render])
    }

    /// `Answering → Submitting`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Answering` and
    /// `SessionError::NoSelection` when there is nothing to submit.
    pub fn begin_submit(&mut self, value: Option<String>) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::Submit, &[SessionPhase::Answering])?;

        let value = match value {
            Some(value) if !value.trim().is_empty() => value.trim().to_owned(),
            Some(_) => return Err(SessionError::NoSelection),
            None => self
                .selection
                .as_ref()
                .map(|choice| choice.as_str().to_owned())
                .ok_or(SessionError::NoSelection)?,
        };

        let invalid = self.invalid(Operation::Submit);
        let Some(session) = self.session.as_mut() else {
            return Err(invalid);
        };
        let Some(question) = session.current_question.take() else {
            return Err(invalid);
        };

        let request = SubmitRequest {
            user_id: session.user_id.clone(),
            session_id: session.session_id.clone(),
            question_id: question.id().clone(),
            answer: value.clone(),
        };
        let answer = Answer::new(question.id().clone(), value);
        self.in_flight = Some(InFlightAnswer { question, answer });
        self.phase = SessionPhase::Submitting;
        self.last_error = None;
        self.timer.stop();

        Ok(vec![
            SessionEffect::StopTimer,
            SessionEffect::Render,
            SessionEffect::RequestSubmit(request),
        ])
    }

    /// `Submitting → Answering | Finished`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Submitting`, or
    /// `SessionError::Protocol` (after rolling back to `Answering`) when the
    /// reply would leave the session without a question or over its length.
    pub fn complete_submit(&mut self, outcome: SubmitOutcome) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::CompleteSubmit, &[SessionPhase::Submitting])?;

        let Some(in_flight) = self.in_flight.take() else {
            return Err(self.invalid(Operation::CompleteSubmit));
        };
        let invalid = self.invalid(Operation::CompleteSubmit);
        let Some(session) = self.session.as_mut() else {
            return Err(invalid);
        };
        let answered_after = session.answered_count().saturating_add(1);

        if outcome.is_finished {
            let graded = outcome
                .results
                .as_ref()
                .and_then(|results| results.history_for(in_flight.answer.question_id()));
            let answer = match graded {
                Some(item) => in_flight
                    .answer
                    .with_outcome(item.is_correct, item.explanation.clone()),
                None => in_flight.answer,
            };
            session.history.push(answer);
            session.is_finished = true;

            self.results = outcome.results;
            self.selection = None;
            self.phase = SessionPhase::Finished;
            self.timer.stop();
            return Ok(vec![
                SessionEffect::StopTimer,
                SessionEffect::ShowResults,
                SessionEffect::Render,
            ]);
        }

        let total = session.total_questions;
        let Some(next_question) = outcome.next_question else {
            return Err(self.rollback_submit(in_flight, ProtocolError::MissingNextQuestion));
        };
        if answered_after >= total {
            return Err(self.rollback_submit(in_flight, ProtocolError::TooManyQuestions { total }));
        }

        session.history.push(in_flight.answer);
        session.current_question = Some(next_question);
        self.selection = None;
        self.phase = SessionPhase::Answering;
        self.timer.resume();
        Ok(vec![SessionEffect::ResumeTimer, SessionEffect::Render])
    }

    /// `Submitting → Answering` after a failed submit request.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside `Submitting`.
    pub fn fail_submit(&mut self, message: String) -> Result<Vec<SessionEffect>, SessionError> {
        self.expect_phase(Operation::FailSubmit, &[SessionPhase::Submitting])?;

        let Some(in_flight) = self.in_flight.take() else {
            return Err(self.invalid(Operation::FailSubmit));
        };
        self.restore_question(in_flight);
        self.last_error = Some(message.clone());
        Ok(vec![
            SessionEffect::ResumeTimer,
            SessionEffect::ShowError(message),
            SessionEffect::Render,
        ])
    }

    /// One scheduler tick. Only counts down while `Answering`.
    pub fn tick(&mut self) -> Vec<SessionEffect> {
        if self.phase != SessionPhase::Answering || !self.timer.is_running() {
            return Vec::new();
        }
        match self.timer.tick() {
            Some(TimerEvent::Expired) => vec![SessionEffect::TimeExpired, SessionEffect::Render],
            None => vec![SessionEffect::Render],
        }
    }

    /// Drop the current attempt and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while a request is in flight.
    pub fn reset(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        if self.phase.is_in_flight() {
            return Err(self.invalid(Operation::Reset));
        }
        self.clear();
        self.phase = SessionPhase::Idle;
        Ok(vec![SessionEffect::StopTimer, SessionEffect::Render])
    }

    fn clear(&mut self) {
        self.context = None;
        self.session = None;
        self.selection = None;
        self.in_flight = None;
        self.results = None;
        self.last_error = None;
        self.timer = Timer::new(self.timer.config());
    }

    fn expect_phase(&self, operation: Operation, allowed: &[SessionPhase]) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: Operation) -> SessionError {
        SessionError::InvalidState {
            operation,
            phase: self.phase,
        }
    }

    fn rollback_start(&mut self, error: ProtocolError) -> SessionError {
        self.context = None;
        self.phase = SessionPhase::Idle;
        self.last_error = Some(error.to_string());
        SessionError::Protocol(error)
    }

    fn rollback_submit(&mut self, in_flight: InFlightAnswer, error: ProtocolError) -> SessionError {
        self.restore_question(in_flight);
        self.last_error = Some(error.to_string());
        SessionError::Protocol(error)
    }

    fn restore_question(&mut self, in_flight: InFlightAnswer) {
        if let Some(session) = self.session.as_mut() {
            session.current_question = Some(in_flight.question);
        }
        self.phase = SessionPhase::Answering;
        self.timer.resume();
    }
}

impl Default for AdaptiveSession {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnswerHistoryItem, Choice, CurriculumSystem, Difficulty, Grade, QuestionId,
    };

    fn question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            "Algebra",
            Difficulty::Medium,
            format!("Question {id}"),
            vec![Choice::new("A", "1"), Choice::new("B", "2")],
        )
    }

    fn context() -> UserContext {
        UserContext::new(UserId::new("student-1"), Grade::G9, CurriculumSystem::Us)
    }

    fn started(total: u32) -> AdaptiveSession {
        let mut machine = AdaptiveSession::default();
        machine.begin_start(context()).unwrap();
        machine
            .complete_start(StartOutcome {
                session_id: SessionId::new("s-1"),
                total_questions: total,
                first_question: Some(question("q1")),
            })
            .unwrap();
        machine
    }

    fn next(id: &str) -> SubmitOutcome {
        SubmitOutcome {
            is_finished: false,
            next_question: Some(question(id)),
            results: None,
        }
    }

    #[test]
    fn start_emits_request_and_enters_starting() {
        let mut machine = AdaptiveSession::default();
        let effects = machine.handle(SessionCommand::Start(context())).unwrap();

        assert_eq!(machine.phase(), SessionPhase::Starting);
        assert!(effects.contains(&SessionEffect::RequestStart(context())));
        assert!(machine.current_question().is_none());
    }

    #[test]
    fn second_start_while_starting_is_rejected() {
        let mut machine = AdaptiveSession::default();
        machine.begin_start(context()).unwrap();

        let err = machine.begin_start(context()).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                operation: Operation::Start,
                phase: SessionPhase::Starting,
            }
        );

        machine
            .complete_start(StartOutcome {
                session_id: SessionId::new("only"),
                total_questions: 3,
                first_question: Some(question("q1")),
            })
            .unwrap();
        assert_eq!(machine.session().unwrap().session_id().as_str(), "only");
        assert!(machine.complete_start(StartOutcome {
            session_id: SessionId::new("late"),
            total_questions: 3,
            first_question: Some(question("q9")),
        })
        .unwrap_err()
        .is_invalid_state());
        assert_eq!(machine.session().unwrap().session_id().as_str(), "only");
    }

    #[test]
    fn successful_start_starts_timer_and_shows_question() {
        let machine = started(3);
        assert_eq!(machine.phase(), SessionPhase::Answering);
        assert_eq!(machine.current_question().unwrap().id().as_str(), "q1");
        assert!(machine.timer().is_running());
        assert_eq!(machine.timer().remaining(), 1800);
        assert_eq!(machine.progress(), SessionProgress::new(3, 0, false));
    }

    #[test]
    fn failed_start_returns_to_idle_with_error() {
        let mut machine = AdaptiveSession::default();
        machine.begin_start(context()).unwrap();
        let effects = machine.fail_start("connection refused".into()).unwrap();

        assert_eq!(machine.phase(), SessionPhase::Idle);
        assert_eq!(machine.last_error(), Some("connection refused"));
        assert!(effects.contains(&SessionEffect::ShowError("connection refused".into())));
        assert!(machine.session().is_none());
    }

    #[test]
    fn start_without_first_question_rolls_back() {
        let mut machine = AdaptiveSession::default();
        machine.begin_start(context()).unwrap();
        let err = machine
            .complete_start(StartOutcome {
                session_id: SessionId::new("s"),
                total_questions: 3,
                first_question: None,
            })
            .unwrap_err();

        assert_eq!(err, SessionError::Protocol(ProtocolError::MissingFirstQuestion));
        assert_eq!(machine.phase(), SessionPhase::Idle);
        assert!(machine.begin_start(context()).is_ok());
    }

    #[test]
    fn submit_outside_answering_is_invalid_state() {
        let mut idle = AdaptiveSession::default();
        let err = idle.begin_submit(Some("A".into())).unwrap_err();
        assert!(err.is_invalid_state());

        let mut finished = started(1);
        finished.begin_submit(Some("A".into())).unwrap();
        finished
            .complete_submit(SubmitOutcome {
                is_finished: true,
                next_question: None,
                results: Some(TestResults::default()),
            })
            .unwrap();
        let err = finished.handle(SessionCommand::Submit(Some("B".into()))).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidState {
                operation: Operation::Submit,
                phase: SessionPhase::Finished,
            }
        );
    }

    #[test]
    fn submit_requires_selection() {
        let mut machine = started(3);
        assert_eq!(machine.begin_submit(None).unwrap_err(), SessionError::NoSelection);
        assert_eq!(
            machine.begin_submit(Some("  ".into())).unwrap_err(),
            SessionError::NoSelection
        );
        assert_eq!(machine.phase(), SessionPhase::Answering);
    }

    #[test]
    fn select_checks_choice_and_feeds_submit() {
        let mut machine = started(3);
        assert_eq!(
            machine.select(ChoiceId::new("Z")).unwrap_err(),
            SessionError::UnknownChoice(ChoiceId::new("Z"))
        );

        machine.select(ChoiceId::new("B")).unwrap();
        let effects = machine.begin_submit(None).unwrap();
        let request = effects
            .iter()
            .find_map(|effect| match effect {
                SessionEffect::RequestSubmit(request) => Some(request.clone()),
                _ => None,
            })
            .unwrap();

        assert_eq!(request.answer, "B");
        assert_eq!(request.question_id.as_str(), "q1");
        assert_eq!(request.session_id.as_str(), "s-1");
        assert_eq!(request.user_id.as_str(), "student-1");
        assert_eq!(machine.phase(), SessionPhase::Submitting);
        assert!(machine.current_question().is_none());
        assert!(!machine.timer().is_running());
    }

    #[test]
    fn full_run_finishes_after_total_questions() {
        let mut machine = started(3);

        machine.begin_submit(Some("A".into())).unwrap();
        machine.complete_submit(next("q2")).unwrap();
        machine.begin_submit(Some("B".into())).unwrap();
        machine.complete_submit(next("q3")).unwrap();
        assert_eq!(machine.progress().answered, 2);

        machine.begin_submit(Some("A".into())).unwrap();
        let results = TestResults {
            score: 2,
            total: 3,
            answer_history: vec![AnswerHistoryItem {
                question_id: QuestionId::new("q3"),
                is_correct: false,
                difficulty: Difficulty::Hard,
                topic: "Algebra".into(),
                explanation: Some("Check the sign.".into()),
                text_latex: None,
            }],
            ..TestResults::default()
        };
        let effects = machine
            .complete_submit(SubmitOutcome {
                is_finished: true,
                next_question: None,
                results: Some(results),
            })
            .unwrap();

        assert_eq!(machine.phase(), SessionPhase::Finished);
        assert!(effects.contains(&SessionEffect::ShowResults));
        let session = machine.session().unwrap();
        assert_eq!(session.answered_count(), 3);
        assert!(session.is_finished());
        assert_eq!(session.history()[2].is_correct(), Some(false));
        assert_eq!(session.history()[2].explanation(), Some("Check the sign."));
        assert_eq!(session.history()[0].is_correct(), None);
        assert_eq!(machine.results().unwrap().score, 2);
        assert!(machine.current_question().is_none());
        assert!(!machine.timer().is_running());
    }

    #[test]
    fn failed_submit_keeps_count_and_question() {
        let mut machine = started(3);
        machine.select(ChoiceId::new("A")).unwrap();
        machine.begin_submit(None).unwrap();
        let effects = machine.fail_submit("HTTP 500".into()).unwrap();

        assert_eq!(machine.phase(), SessionPhase::Answering);
        assert_eq!(machine.progress().answered, 0);
        assert_eq!(machine.current_question().unwrap().id().as_str(), "q1");
        assert_eq!(machine.selection(), Some(&ChoiceId::new("A")));
        assert!(machine.timer().is_running());
        assert!(effects.contains(&SessionEffect::ResumeTimer));
    }

    #[test]
    fn next_question_beyond_total_is_rejected() {
        let mut machine = started(1);
        machine.begin_submit(Some("A".into())).unwrap();
        let err = machine.complete_submit(next("q2")).unwrap_err();

        assert_eq!(
            err,
            SessionError::Protocol(ProtocolError::TooManyQuestions { total: 1 })
        );
        assert_eq!(machine.phase(), SessionPhase::Answering);
        assert_eq!(machine.progress().answered, 0);
        assert_eq!(machine.current_question().unwrap().id().as_str(), "q1");
    }

    #[test]
    fn unfinished_reply_without_question_is_rejected() {
        let mut machine = started(3);
        machine.begin_submit(Some("A".into())).unwrap();
        let err = machine
            .complete_submit(SubmitOutcome {
                is_finished: false,
                next_question: None,
                results: None,
            })
            .unwrap_err();
        assert_eq!(err, SessionError::Protocol(ProtocolError::MissingNextQuestion));
        assert_eq!(machine.phase(), SessionPhase::Answering);
    }

    #[test]
    fn ticks_only_count_while_answering() {
        let mut machine = AdaptiveSession::new(TimerConfig::default().with_duration(1));
        assert!(machine.tick().is_empty());

        machine.begin_start(context()).unwrap();
        machine
            .complete_start(StartOutcome {
                session_id: SessionId::new("s"),
                total_questions: 2,
                first_question: Some(question("q1")),
            })
            .unwrap();

        assert_eq!(machine.tick(), vec![SessionEffect::Render]);
        assert_eq!(
            machine.handle(SessionCommand::Tick).unwrap(),
            vec![SessionEffect::TimeExpired, SessionEffect::Render]
        );
        assert!(machine.timer().is_overtime());

        machine.begin_submit(Some("A".into())).unwrap();
        assert!(machine.tick().is_empty());
        assert_eq!(machine.timer().remaining(), -1);
    }

    #[test]
    fn reset_is_blocked_while_in_flight() {
        let mut machine = AdaptiveSession::default();
        machine.begin_start(context()).unwrap();
        assert!(machine.reset().unwrap_err().is_invalid_state());

        let mut machine = started(2);
        machine.reset().unwrap();
        assert_eq!(machine.phase(), SessionPhase::Idle);
        assert!(machine.session().is_none());
    }

    #[test]
    fn new_start_after_finish_replaces_session() {
        let mut machine = started(1);
        machine.begin_submit(Some("A".into())).unwrap();
        machine
            .complete_submit(SubmitOutcome {
                is_finished: true,
                next_question: None,
                results: None,
            })
            .unwrap();

        machine.begin_start(context()).unwrap();
        assert!(machine.session().is_none());
        assert!(machine.results().is_none());
        assert_eq!(machine.phase(), SessionPhase::Starting);
    }
}
