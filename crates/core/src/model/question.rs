use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::nullable;

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty tier reported by the backend.
///
/// The adaptive engine walks `Easy ↔ Medium ↔ Hard`; anything else the backend
/// sends is kept verbatim in `Other` so it can still be shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Other(raw) => raw,
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Other(value),
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// One selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: ChoiceId::new(id),
            text: text.into(),
        }
    }
}

/// A question served by the adaptive backend.
///
/// Immutable once received. The backend strips `correct_answer` and
/// `explanation` before sending, so neither is modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    #[serde(default = "nullable::general_topic", deserialize_with = "nullable::topic")]
    topic: String,
    #[serde(default, deserialize_with = "nullable::or_default")]
    difficulty: Difficulty,
    #[serde(rename = "text_latex", alias = "text", default)]
    text: String,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtopic: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        topic: impl Into<String>,
        difficulty: Difficulty,
        text: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            difficulty,
            text: text.into(),
            choices,
            subtopic: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn subtopic(&self) -> Option<&str> {
        self.subtopic.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    /// Question body, LaTeX delimited with `$...$` / `$$...$$`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }

    /// Choice at a zero-based position; the display layer labels them `A`, `B`, ...
    #[must_use]
    pub fn choice_at(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_deserializes_from_backend_shape() {
        let raw = r#"{
            "id": "US_G9_Algebra_1700000000",
            "topic": "Algebra",
            "subtopic": "Linear equations",
            "difficulty": "Hard",
            "text_latex": "Solve $2x + 3 = 7$",
            "choices": [{"id": "A", "text": "$x=2$"}, {"id": "B", "text": "$x=5$"}],
            "grade": "G9"
        }"#;

        let question: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(question.id().as_str(), "US_G9_Algebra_1700000000");
        assert_eq!(question.difficulty(), &Difficulty::Hard);
        assert_eq!(question.text(), "Solve $2x + 3 = 7$");
        assert_eq!(question.subtopic(), Some("Linear equations"));
        assert_eq!(question.choice(&ChoiceId::new("B")).unwrap().text, "$x=5$");
        assert!(question.choice(&ChoiceId::new("E")).is_none());
    }

    #[test]
    fn missing_topic_and_difficulty_fall_back() {
        let question: Question =
            serde_json::from_str(r#"{"id": "q1", "text": "1 + 1?", "choices": []}"#).unwrap();
        assert_eq!(question.topic(), "General");
        assert_eq!(question.difficulty(), &Difficulty::Medium);
        assert_eq!(question.text(), "1 + 1?");
    }

    #[test]
    fn null_topic_and_difficulty_fall_back() {
        let question: Question = serde_json::from_str(
            r#"{"id": "q7", "topic": null, "difficulty": null, "text_latex": "$3x$", "choices": []}"#,
        )
        .unwrap();
        assert_eq!(question.topic(), "General");
        assert_eq!(question.difficulty(), &Difficulty::Medium);
    }

    #[test]
    fn unknown_difficulty_is_preserved() {
        let difficulty = Difficulty::from("Olympiad".to_owned());
        assert_eq!(difficulty, Difficulty::Other("Olympiad".into()));
        assert_eq!(String::from(difficulty), "Olympiad");
        assert_eq!(Difficulty::from(" easy ".to_owned()), Difficulty::Easy);
    }
}
