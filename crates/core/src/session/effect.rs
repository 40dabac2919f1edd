use serde::Deserialize;

use crate::model::{ChoiceId, Question, QuestionId, SessionId, TestResults, UserContext, UserId};

/// Input to `AdaptiveSession::handle`.
///
/// User intents (`Start`, `Select`, `Submit`, `Reset`), scheduler ticks, and
/// the completions of requests the machine asked for via `SessionEffect`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start(UserContext),
    StartSucceeded(StartOutcome),
    StartFailed(String),
    Select(ChoiceId),
    /// Submit an explicit value, or the pending selection when `None`.
    Submit(Option<String>),
    SubmitSucceeded(SubmitOutcome),
    SubmitFailed(String),
    Tick,
    Reset,
}

/// Side effect requested by a transition. The controller runs the requests
/// and the timer effects; the render adapter handles the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    RequestStart(UserContext),
    RequestSubmit(SubmitRequest),
    StartTimer { duration_secs: u32 },
    ResumeTimer,
    StopTimer,
    Render,
    ShowResults,
    ShowError(String),
    TimeExpired,
}

impl SessionEffect {
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            SessionEffect::RequestStart(_) | SessionEffect::RequestSubmit(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub answer: String,
}

/// Successful reply to a start request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartOutcome {
    pub session_id: SessionId,
    pub total_questions: u32,
    #[serde(default)]
    pub first_question: Option<Question>,
}

/// Successful reply to a submit request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitOutcome {
    pub is_finished: bool,
    #[serde(default)]
    pub next_question: Option<Question>,
    #[serde(default)]
    pub results: Option<TestResults>,
}
