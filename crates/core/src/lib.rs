#![forbid(unsafe_code)]

pub mod legacy;
pub mod model;
pub mod session;
pub mod time;
pub mod timer;

pub use legacy::{LegacyError, LegacyPhase, LegacyRun, LegacySubmission};
pub use session::{
    AdaptiveSession, SessionCommand, SessionEffect, SessionError, SessionPhase, SessionSnapshot,
};
pub use time::Clock;
pub use timer::{Timer, TimerConfig, TimerEvent, TimerLevel, TimerState};
