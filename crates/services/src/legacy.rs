use std::sync::Arc;

use tracing::{info, warn};

use mathiter_core::model::{ProblemId, UserContext};
use mathiter_core::{Clock, LegacyRun, TimerConfig, TimerEvent};

use crate::api::{AnalyzeRequest, LegacyTestApi};
use crate::error::ClientError;

/// Drives a `LegacyRun` against the fixed-problem-set endpoints.
pub struct LegacyTestController {
    api: Arc<dyn LegacyTestApi>,
    run: LegacyRun,
    clock: Clock,
    user: UserContext,
}

impl LegacyTestController {
    #[must_use]
    pub fn new(
        api: Arc<dyn LegacyTestApi>,
        clock: Clock,
        user: UserContext,
        timer_config: TimerConfig,
    ) -> Self {
        Self {
            api,
            run: LegacyRun::new(timer_config),
            clock,
            user,
        }
    }

    #[must_use]
    pub fn run(&self) -> &LegacyRun {
        &self.run
    }

    #[must_use]
    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Fetch the problem set and start the countdown.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Legacy` for a call in the wrong phase or an empty
    /// set, and `ClientError::Network` when the fetch fails.
    pub async fn load(&mut self) -> Result<usize, ClientError> {
        self.run.begin_load()?;
        match self.api.load_problems().await {
            Ok(problems) => {
                let count = problems.len();
                self.run
                    .complete_load(problems, self.clock.now())
                    .inspect_err(|err| warn!(error = %err, "problem set rejected"))?;
                info!(count, "problem set loaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "loading problems failed");
                self.run.fail_load(err.to_string())?;
                Err(err.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ClientError::Legacy` outside `InProgress` or for an unknown id.
    pub fn answer(&mut self, problem_id: ProblemId, value: impl Into<String>) -> Result<(), ClientError> {
        Ok(self.run.answer(problem_id, value)?)
    }

    /// Submit every non-blank answer for grading and analysis. Returns the
    /// number graded correct; the full report is on `run()`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Legacy` when nothing was answered and
    /// `ClientError::Network` when the request fails; answers are kept.
    pub async fn submit(&mut self) -> Result<usize, ClientError> {
        let submission = self.run.begin_submit(self.clock.now())?;
        let request = AnalyzeRequest::new(&self.user, submission);
        info!(
            answers = request.answers.len(),
            total_time_spent = request.total_time_spent,
            is_overtime = request.is_overtime,
            "submitting problem set"
        );

        match self.api.submit_and_analyze(&request).await {
            Ok(report) => {
                let correct = report.correct_count();
                info!(
                    session_id = report.session_id.as_deref().unwrap_or("-"),
                    correct,
                    graded = report.test_results.len(),
                    "analysis received"
                );
                self.run.complete_submit(report)?;
                Ok(correct)
            }
            Err(err) => {
                warn!(error = %err, "submit and analyze failed");
                self.run.fail_submit(err.to_string())?;
                Err(err.into())
            }
        }
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        self.run.tick()
    }
}
