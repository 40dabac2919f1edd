use crate::model::{Answer, ChoiceId, Question, SessionId, TestResults};
use crate::session::SessionPhase;
use crate::session::progress::SessionProgress;
use crate::timer::{Timer, TimerLevel, TimerState};

/// Display-ready view of the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub state: TimerState,
    pub level: TimerLevel,
    pub display: String,
}

impl TimerView {
    #[must_use]
    pub fn of(timer: &Timer) -> Self {
        Self {
            state: timer.state(),
            level: timer.level(),
            display: timer.display(),
        }
    }
}

/// Borrowed view of an `AdaptiveSession` handed to the render layer.
#[derive(Debug, Clone)]
pub struct SessionSnapshot<'a> {
    pub phase: SessionPhase,
    pub session_id: Option<&'a SessionId>,
    pub progress: SessionProgress,
    pub current_question: Option<&'a Question>,
    pub selection: Option<&'a ChoiceId>,
    pub timer: TimerView,
    pub history: &'a [Answer],
    pub results: Option<&'a TestResults>,
    pub last_error: Option<&'a str>,
}
