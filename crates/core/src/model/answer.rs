use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// One submitted answer in a session's ordered history.
///
/// Grading is only known once the backend finishes the session, so the
/// outcome is attached while building the record, never afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    question_id: QuestionId,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, value: impl Into<String>) -> Self {
        Self {
            question_id,
            value: value.into(),
            is_correct: None,
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_outcome(mut self, is_correct: bool, explanation: Option<String>) -> Self {
        self.is_correct = Some(is_correct);
        self.explanation = explanation;
        self
    }

    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }
}
