//! JSON request bodies. Response bodies deserialize straight into core types.

use serde::{Deserialize, Serialize};

use mathiter_core::LegacySubmission;
use mathiter_core::model::{ProblemAnswer, UserContext};
use mathiter_core::session::SubmitRequest;

pub const ADAPTIVE_TEST_TYPE: &str = "adaptive_test";
pub const LEVEL_TEST_TYPE: &str = "level_test";

#[derive(Debug, Serialize)]
pub struct StartTestRequest<'a> {
    pub user_id: &'a str,
    pub grade: &'a str,
    pub curriculum_category: &'a str,
    pub test_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_difficulty: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
}

impl<'a> StartTestRequest<'a> {
    #[must_use]
    pub fn from_context(context: &'a UserContext) -> Self {
        Self {
            user_id: context.user_id.as_str(),
            grade: context.grade.code(),
            curriculum_category: context.system.curriculum_category(),
            test_type: ADAPTIVE_TEST_TYPE,
            target_difficulty: context.target_difficulty.as_ref().map(|d| d.as_str()),
            topic: context.topic.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerRequest<'a> {
    pub user_id: &'a str,
    pub session_id: &'a str,
    pub question_id: &'a str,
    pub answer: &'a str,
}

impl<'a> From<&'a SubmitRequest> for SubmitAnswerRequest<'a> {
    fn from(request: &'a SubmitRequest) -> Self {
        Self {
            user_id: request.user_id.as_str(),
            session_id: request.session_id.as_str(),
            question_id: request.question_id.as_str(),
            answer: &request.answer,
        }
    }
}

/// Body of `POST /submit_and_analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzeRequest {
    pub user_id: String,
    pub is_guest: bool,
    pub test_type: &'static str,
    pub grade: String,
    pub curriculum_category: String,
    pub answers: Vec<ProblemAnswer>,
    pub total_time_spent: u64,
    pub time_limit: u32,
    pub is_overtime: bool,
}

impl AnalyzeRequest {
    #[must_use]
    pub fn new(context: &UserContext, submission: LegacySubmission) -> Self {
        Self {
            user_id: context.user_id.to_string(),
            is_guest: context.user_id.as_str().starts_with("guest_"),
            test_type: LEVEL_TEST_TYPE,
            grade: context.grade.code().to_owned(),
            curriculum_category: context.system.curriculum_category().to_owned(),
            answers: submission.answers,
            total_time_spent: submission.total_time_spent,
            time_limit: submission.time_limit,
            is_overtime: submission.is_overtime,
        }
    }
}

/// Error body the backend sends with non-2xx replies.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn message(self) -> Option<String> {
        match (self.error, self.error_type) {
            (Some(error), Some(kind)) => Some(format!("{error} ({kind})")),
            (Some(error), None) => Some(error),
            (None, Some(kind)) => Some(kind),
            (None, None) => None,
        }
    }
}
