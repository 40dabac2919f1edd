use std::fmt;

use thiserror::Error;

use crate::model::ChoiceId;
use crate::session::SessionPhase;

/// Session operation named in `SessionError::InvalidState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    CompleteStart,
    FailStart,
    Select,
    Submit,
    CompleteSubmit,
    FailSubmit,
    Reset,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Start => "start",
            Operation::CompleteStart => "complete start",
            Operation::FailStart => "fail start",
            Operation::Select => "select",
            Operation::Submit => "submit",
            Operation::CompleteSubmit => "complete submit",
            Operation::FailSubmit => "fail submit",
            Operation::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Server replies that are well-formed JSON but break the session protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolError {
    #[error("start response has no first question")]
    MissingFirstQuestion,
    #[error("start response announces zero questions")]
    EmptySession,
    #[error("submit response is not finished but has no next question")]
    MissingNextQuestion,
    #[error("server sent another question after all {total} were answered")]
    TooManyQuestions { total: u32 },
}

/// Errors emitted by the adaptive session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {operation} while {phase}")]
    InvalidState {
        operation: Operation,
        phase: SessionPhase,
    },
    #[error("no answer selected")]
    NoSelection,
    #[error("choice {0} is not part of the current question")]
    UnknownChoice(ChoiceId),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SessionError {
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, SessionError::InvalidState { .. })
    }
}
