#![forbid(unsafe_code)]

pub mod adaptive;
pub mod api;
pub mod config;
pub mod error;
pub mod legacy;

pub use mathiter_core::Clock;

pub use adaptive::AdaptiveTestController;
pub use api::{AdaptiveTestApi, HttpApiClient, LegacyTestApi};
pub use config::ApiConfig;
pub use error::{ApiError, ClientError, ConfigError};
pub use legacy::LegacyTestController;
