use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::nullable;
use crate::model::question::Difficulty;

/// Per-question line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerHistoryItem {
    pub question_id: QuestionId,
    pub is_correct: bool,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub difficulty: Difficulty,
    #[serde(default = "nullable::general_topic", deserialize_with = "nullable::topic")]
    pub topic: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub text_latex: Option<String>,
}

/// Accuracy for one topic, in whole percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAnalysis {
    #[serde(default = "nullable::general_topic", deserialize_with = "nullable::topic")]
    pub topic: String,
    pub accuracy: u8,
    #[serde(default)]
    pub total: u32,
}

/// Results of a finished adaptive session, as computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub score_percent: u8,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub recommendation_text: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub recommended_course: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    pub recommended_module: String,
    #[serde(default)]
    pub answer_history: Vec<AnswerHistoryItem>,
    #[serde(default)]
    pub topic_analysis: Vec<TopicAnalysis>,
}

impl TestResults {
    #[must_use]
    pub fn history_for(&self, question_id: &QuestionId) -> Option<&AnswerHistoryItem> {
        self.answer_history
            .iter()
            .find(|item| &item.question_id == question_id)
    }

    /// Items the test taker got wrong; these are the ones with a viewable solution.
    pub fn incorrect(&self) -> impl Iterator<Item = &AnswerHistoryItem> {
        self.answer_history.iter().filter(|item| !item.is_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_deserialize_with_partial_fields() {
        let raw = r#"{
            "score": 2,
            "total": 3,
            "score_percent": 66,
            "recommendation_text": "You have a solid foundation.",
            "recommended_course": "US Math",
            "answer_history": [
                {"question_id": "q1", "is_correct": true, "difficulty": "Medium", "topic": "Algebra"},
                {"question_id": "q2", "is_correct": false, "explanation": "Distribute first."}
            ],
            "topic_analysis": [{"topic": "Algebra", "accuracy": 50, "total": 2}]
        }"#;

        let results: TestResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.score, 2);
        assert_eq!(results.recommended_module, "");
        assert_eq!(results.topic_analysis[0].accuracy, 50);

        let wrong: Vec<_> = results.incorrect().collect();
        assert_eq!(wrong.len(), 1);
        assert_eq!(wrong[0].topic, "General");
        assert_eq!(
            results
                .history_for(&QuestionId::new("q2"))
                .and_then(|item| item.explanation.as_deref()),
            Some("Distribute first.")
        );
    }

    #[test]
    fn null_topics_read_as_general() {
        let raw = r#"{
            "score": 1,
            "total": 2,
            "recommended_module": null,
            "answer_history": [
                {"question_id": "q1", "is_correct": true, "difficulty": null, "topic": null},
                {"question_id": "q2", "is_correct": false, "topic": "Geometry"}
            ],
            "topic_analysis": [{"topic": null, "accuracy": 100, "total": 1}]
        }"#;

        let results: TestResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.answer_history[0].topic, "General");
        assert_eq!(results.answer_history[0].difficulty, Difficulty::Medium);
        assert_eq!(results.answer_history[1].topic, "Geometry");
        assert_eq!(results.topic_analysis[0].topic, "General");
        assert_eq!(results.recommended_module, "");
    }
}
