mod effect;
mod error;
mod machine;
mod progress;
mod snapshot;

pub use effect::{SessionCommand, SessionEffect, StartOutcome, SubmitOutcome, SubmitRequest};
pub use error::{Operation, ProtocolError, SessionError};
pub use machine::{AdaptiveSession, Session, SessionPhase};
pub use progress::SessionProgress;
pub use snapshot::{SessionSnapshot, TimerView};
