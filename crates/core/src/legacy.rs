//! Fixed-problem-set test: load every problem up front, answer freely,
//! submit once for grading and AI analysis.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnalysisReport, Problem, ProblemAnswer, ProblemId};
use crate::time::seconds_between;
use crate::timer::{Timer, TimerConfig, TimerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyPhase {
    #[default]
    Idle,
    Loading,
    InProgress,
    Submitting,
    Completed,
}

impl fmt::Display for LegacyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LegacyPhase::Idle => "idle",
            LegacyPhase::Loading => "loading",
            LegacyPhase::InProgress => "in progress",
            LegacyPhase::Submitting => "submitting",
            LegacyPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LegacyError {
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: LegacyPhase,
    },
    #[error("no problems were returned")]
    NoProblems,
    #[error("no answers to submit")]
    NoAnswers,
    #[error("unknown problem {0}")]
    UnknownProblem(ProblemId),
}

impl LegacyError {
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, LegacyError::InvalidState { .. })
    }
}

/// Everything the submit-and-analyze call needs besides the user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySubmission {
    pub answers: Vec<ProblemAnswer>,
    pub total_time_spent: u64,
    pub time_limit: u32,
    pub is_overtime: bool,
}

#[derive(Debug)]
pub struct LegacyRun {
    phase: LegacyPhase,
    timer: Timer,
    problems: Vec<Problem>,
    answers: HashMap<ProblemId, String>,
    started_at: Option<DateTime<Utc>>,
    report: Option<AnalysisReport>,
    last_error: Option<String>,
}

impl LegacyRun {
    #[must_use]
    pub fn new(timer_config: TimerConfig) -> Self {
        Self {
            phase: LegacyPhase::Idle,
            timer: Timer::new(timer_config),
            problems: Vec::new(),
            answers: HashMap::new(),
            started_at: None,
            report: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> LegacyPhase {
        self.phase
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn answer_for(&self, problem_id: &ProblemId) -> Option<&str> {
        self.answers.get(problem_id).map(String::as_str)
    }

    #[must_use]
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `Idle | Completed → Loading`.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::InvalidState` while a run is loading or active.
    pub fn begin_load(&mut self) -> Result<(), LegacyError> {
        self.expect_phase("load problems", &[LegacyPhase::Idle, LegacyPhase::Completed])?;
        self.problems.clear();
        self.answers.clear();
        self.report = None;
        self.last_error = None;
        self.started_at = None;
        self.timer = Timer::new(self.timer.config());
        self.phase = LegacyPhase::Loading;
        Ok(())
    }

    /// `Loading → InProgress`; starts the countdown.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::NoProblems` (back in `Idle`) for an empty set.
    pub fn complete_load(&mut self, problems: Vec<Problem>, now: DateTime<Utc>) -> Result<(), LegacyError> {
        self.expect_phase("finish loading", &[LegacyPhase::Loading])?;
        if problems.is_empty() {
            self.phase = LegacyPhase::Idle;
            self.last_error = Some(LegacyError::NoProblems.to_string());
            return Err(LegacyError::NoProblems);
        }

        self.problems = problems;
        self.started_at = Some(now);
        self.timer.start(self.timer.config().duration_secs);
        self.phase = LegacyPhase::InProgress;
        Ok(())
    }

    /// `Loading → Idle`.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::InvalidState` outside `Loading`.
    pub fn fail_load(&mut self, message: String) -> Result<(), LegacyError> {
        self.expect_phase("fail loading", &[LegacyPhase::Loading])?;
        self.phase = LegacyPhase::Idle;
        self.last_error = Some(message);
        Ok(())
    }

    /// Record or overwrite the answer to one problem.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::UnknownProblem` for ids outside the loaded set.
    pub fn answer(&mut self, problem_id: ProblemId, value: impl Into<String>) -> Result<(), LegacyError> {
        self.expect_phase("answer", &[LegacyPhase::InProgress])?;
        if !self.problems.iter().any(|p| p.problem_id == problem_id) {
            return Err(LegacyError::UnknownProblem(problem_id));
        }
        self.answers.insert(problem_id, value.into());
        Ok(())
    }

    /// `InProgress → Submitting`; stops the countdown.
    ///
    /// Answers are collected in problem order and blank ones are dropped.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::NoAnswers` (still `InProgress`) when nothing was answered.
    pub fn begin_submit(&mut self, now: DateTime<Utc>) -> Result<LegacySubmission, LegacyError> {
        self.expect_phase("submit", &[LegacyPhase::InProgress])?;

        let answers: Vec<ProblemAnswer> = self
            .problems
            .iter()
            .filter_map(|problem| {
                let value = self.answers.get(&problem.problem_id)?.trim();
                (!value.is_empty()).then(|| ProblemAnswer {
                    problem_id: problem.problem_id.clone(),
                    user_answer: value.to_owned(),
                })
            })
            .collect();
        if answers.is_empty() {
            return Err(LegacyError::NoAnswers);
        }

        self.timer.stop();
        let time_limit = self.timer.config().duration_secs;
        let total_time_spent = self
            .started_at
            .map_or(0, |started_at| seconds_between(started_at, now));
        self.phase = LegacyPhase::Submitting;
        self.last_error = None;

        Ok(LegacySubmission {
            answers,
            total_time_spent,
            time_limit,
            is_overtime: total_time_spent > u64::from(time_limit),
        })
    }

    /// `Submitting → Completed`.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::InvalidState` outside `Submitting`.
    pub fn complete_submit(&mut self, report: AnalysisReport) -> Result<(), LegacyError> {
        self.expect_phase("finish submitting", &[LegacyPhase::Submitting])?;
        self.report = Some(report);
        self.phase = LegacyPhase::Completed;
        Ok(())
    }

    /// `Submitting → InProgress`. The countdown stays stopped.
    ///
    /// # Errors
    ///
    /// Returns `LegacyError::InvalidState` outside `Submitting`.
    pub fn fail_submit(&mut self, message: String) -> Result<(), LegacyError> {
        self.expect_phase("fail submitting", &[LegacyPhase::Submitting])?;
        self.phase = LegacyPhase::InProgress;
        self.last_error = Some(message);
        Ok(())
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.phase != LegacyPhase::InProgress {
            return None;
        }
        self.timer.tick()
    }

    fn expect_phase(&self, operation: &'static str, allowed: &[LegacyPhase]) -> Result<(), LegacyError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(LegacyError::InvalidState {
                operation,
                phase: self.phase,
            })
        }
    }
}

impl Default for LegacyRun {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}
