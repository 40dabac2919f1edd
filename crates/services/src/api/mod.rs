//! Backend endpoints consumed by the controllers.

mod http;
pub mod wire;

use async_trait::async_trait;

use mathiter_core::model::{AnalysisReport, Problem, UserContext};
use mathiter_core::session::{StartOutcome, SubmitOutcome, SubmitRequest};

use crate::error::ApiError;

pub use http::HttpApiClient;
pub use wire::AnalyzeRequest;

pub const START_PATH: &str = "/api/adaptive-test/start";
pub const SUBMIT_PATH: &str = "/api/adaptive-test/submit";
pub const PROBLEMS_PATH: &str = "/get_test_problems";
pub const ANALYZE_PATH: &str = "/submit_and_analyze";

/// Adaptive test protocol: one question at a time, chosen by the server.
#[async_trait]
pub trait AdaptiveTestApi: Send + Sync {
    async fn start_test(&self, context: &UserContext) -> Result<StartOutcome, ApiError>;

    async fn submit_answer(&self, request: &SubmitRequest) -> Result<SubmitOutcome, ApiError>;
}

/// Legacy protocol: fetch a fixed problem set, submit everything at once.
#[async_trait]
pub trait LegacyTestApi: Send + Sync {
    async fn load_problems(&self) -> Result<Vec<Problem>, ApiError>;

    async fn submit_and_analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisReport, ApiError>;
}
