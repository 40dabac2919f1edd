use std::sync::Arc;

use tracing::{debug, info, warn};

use mathiter_core::model::{ChoiceId, UserContext};
use mathiter_core::session::{SessionSnapshot, SubmitRequest};
use mathiter_core::{AdaptiveSession, SessionCommand, SessionEffect, SessionError, TimerConfig};

use crate::api::AdaptiveTestApi;
use crate::error::ClientError;

/// Owns one `AdaptiveSession` and carries out the requests it asks for.
///
/// Commands go in, effects come out. Request effects are executed here and
/// replaced by the effects of their completion, so callers only ever see
/// timer and render effects.
pub struct AdaptiveTestController {
    api: Arc<dyn AdaptiveTestApi>,
    session: AdaptiveSession,
    failure_effects: Vec<SessionEffect>,
}

/// A request that failed, with the effects of rolling the session back.
struct Failed {
    error: ClientError,
    rollback: Vec<SessionEffect>,
}

impl From<SessionError> for Failed {
    fn from(err: SessionError) -> Self {
        Self {
            error: err.into(),
            rollback: Vec::new(),
        }
    }
}

impl AdaptiveTestController {
    #[must_use]
    pub fn new(api: Arc<dyn AdaptiveTestApi>, timer_config: TimerConfig) -> Self {
        Self {
            api,
            session: AdaptiveSession::new(timer_config),
            failure_effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn session(&self) -> &AdaptiveSession {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        self.session.snapshot()
    }

    /// Apply a command and run any request it triggers.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Session` for commands that do not fit the phase and
    /// `ClientError::Network` when a request fails. The session is back in its
    /// last stable phase in both cases. After a failed request the effects of
    /// that rollback (`ShowError`, `ResumeTimer`, `Render`, ...) are kept for
    /// [`AdaptiveTestController::take_failure_effects`].
    pub async fn dispatch(&mut self, command: SessionCommand) -> Result<Vec<SessionEffect>, ClientError> {
        self.failure_effects.clear();
        let effects = self.session.handle(command)?;
        let mut out = Vec::with_capacity(effects.len());
        for effect in effects {
            let completed = match effect {
                SessionEffect::RequestStart(context) => self.run_start(&context).await,
                SessionEffect::RequestSubmit(request) => self.run_submit(&request).await,
                other => {
                    out.push(other);
                    continue;
                }
            };
            match completed {
                Ok(effects) => out.extend(effects),
                Err(Failed { error, rollback }) => {
                    out.extend(rollback);
                    self.failure_effects = out;
                    return Err(error);
                }
            }
        }
        Ok(out)
    }

    /// Effects produced up to and including the rollback of the last failed
    /// request. Drained on read; cleared by the next dispatch.
    pub fn take_failure_effects(&mut self) -> Vec<SessionEffect> {
        std::mem::take(&mut self.failure_effects)
    }

    /// # Errors
    ///
    /// See [`AdaptiveTestController::dispatch`].
    pub async fn start(&mut self, context: UserContext) -> Result<Vec<SessionEffect>, ClientError> {
        self.dispatch(SessionCommand::Start(context)).await
    }

    /// # Errors
    ///
    /// See [`AdaptiveTestController::dispatch`].
    pub async fn select(&mut self, choice: ChoiceId) -> Result<Vec<SessionEffect>, ClientError> {
        self.dispatch(SessionCommand::Select(choice)).await
    }

    /// Submit an explicit value, or the current selection when `None`.
    ///
    /// # Errors
    ///
    /// See [`AdaptiveTestController::dispatch`].
    pub async fn submit(&mut self, answer: Option<String>) -> Result<Vec<SessionEffect>, ClientError> {
        self.dispatch(SessionCommand::Submit(answer)).await
    }

    pub fn tick(&mut self) -> Vec<SessionEffect> {
        self.session.tick()
    }

    /// # Errors
    ///
    /// Returns `ClientError::Session` while a request is in flight.
    pub fn reset(&mut self) -> Result<Vec<SessionEffect>, ClientError> {
        Ok(self.session.reset()?)
    }

    async fn run_start(&mut self, context: &UserContext) -> Result<Vec<SessionEffect>, Failed> {
        info!(
            user_id = %context.user_id,
            grade = %context.grade,
            category = context.system.curriculum_category(),
            "starting adaptive test"
        );
        match self.api.start_test(context).await {
            Ok(outcome) => {
                let session_id = outcome.session_id.clone();
                match self.session.complete_start(outcome) {
                    Ok(effects) => {
                        info!(%session_id, "adaptive test started");
                        Ok(effects)
                    }
                    Err(err) => {
                        warn!(error = %err, "start response rejected");
                        Err(self.rejected(err, Vec::new()))
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "start request failed");
                let rollback = self.session.fail_start(err.to_string()).map_err(Failed::from)?;
                Err(Failed {
                    error: err.into(),
                    rollback,
                })
            }
        }
    }

    async fn run_submit(&mut self, request: &SubmitRequest) -> Result<Vec<SessionEffect>, Failed> {
        debug!(
            session_id = %request.session_id,
            question_id = %request.question_id,
            "submitting answer"
        );
        match self.api.submit_answer(request).await {
            Ok(outcome) => {
                let finished = outcome.is_finished;
                match self.session.complete_submit(outcome) {
                    Ok(effects) => {
                        if finished {
                            info!(session_id = %request.session_id, "adaptive test finished");
                        }
                        Ok(effects)
                    }
                    Err(err) => {
                        warn!(error = %err, "submit response rejected");
                        Err(self.rejected(err, vec![SessionEffect::ResumeTimer]))
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "submit request failed");
                let rollback = self.session.fail_submit(err.to_string()).map_err(Failed::from)?;
                Err(Failed {
                    error: err.into(),
                    rollback,
                })
            }
        }
    }

    /// The session already rolled back on a rejected reply; report it the way
    /// `fail_start` and `fail_submit` report a failed request.
    fn rejected(&self, error: SessionError, mut rollback: Vec<SessionEffect>) -> Failed {
        if let Some(message) = self.session.snapshot().last_error {
            rollback.push(SessionEffect::ShowError(message.to_string()));
        }
        rollback.push(SessionEffect::Render);
        Failed {
            error: error.into(),
            rollback,
        }
    }
}
