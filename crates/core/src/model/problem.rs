use serde::{Deserialize, Serialize};

use crate::model::ids::ProblemId;
use crate::model::nullable;

/// Choices of a legacy problem: labelled options (`"A) 12"`) or a
/// free-response marker string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemChoices {
    Options(Vec<String>),
    FreeResponse(String),
}

impl Default for ProblemChoices {
    fn default() -> Self {
        ProblemChoices::FreeResponse(String::new())
    }
}

impl ProblemChoices {
    #[must_use]
    pub fn is_free_response(&self) -> bool {
        matches!(self, ProblemChoices::FreeResponse(_))
    }

    /// Value submitted for an option: the leading letter of `"A) text"`,
    /// otherwise the whole label. Only `A` to `D` are recognised; the backend
    /// grades four-option sheets, so `"E) ..."` is sent verbatim.
    #[must_use]
    pub fn option_value(label: &str) -> &str {
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(letter @ 'A'..='D'), Some(')')) => &label[..letter.len_utf8()],
            _ => label,
        }
    }
}

/// A problem from the fixed legacy problem set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProblemRecord")]
pub struct Problem {
    pub problem_id: ProblemId,
    pub text_latex: String,
    pub choices: ProblemChoices,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

/// Stored problem document as served by `get_test_problems`. The backend adds
/// the document id as `id` next to `problem_id`; either may be absent.
#[derive(Deserialize)]
struct ProblemRecord {
    #[serde(default)]
    problem_id: Option<ProblemId>,
    #[serde(default)]
    id: Option<ProblemId>,
    #[serde(default)]
    text_latex: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, deserialize_with = "nullable::or_default")]
    choices: ProblemChoices,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl TryFrom<ProblemRecord> for Problem {
    type Error = String;

    fn try_from(record: ProblemRecord) -> Result<Self, Self::Error> {
        let problem_id = record
            .problem_id
            .or(record.id)
            .ok_or_else(|| "problem has neither `problem_id` nor `id`".to_owned())?;
        Ok(Self {
            problem_id,
            text_latex: record.text_latex.or(record.text).unwrap_or_default(),
            choices: record.choices,
            difficulty: record.difficulty,
            category: record.category,
        })
    }
}

/// One answer collected from the legacy problem sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemAnswer {
    pub problem_id: ProblemId,
    pub user_answer: String,
}

/// Backend grading of one legacy problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedProblem {
    pub id: ProblemId,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub text_latex: Option<String>,
    #[serde(default)]
    pub ai_solution: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Response of the legacy submit-and-analyze call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub test_results: Vec<GradedProblem>,
    #[serde(default)]
    pub ai_analysis_report: String,
}

impl AnalysisReport {
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.test_results.iter().filter(|r| r.is_correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_choices_accept_both_shapes() {
        let options: Problem = serde_json::from_str(
            r#"{"problem_id": "p1", "text_latex": "$1+1$", "choices": ["A) 1", "B) 2"]}"#,
        )
        .unwrap();
        assert_eq!(
            options.choices,
            ProblemChoices::Options(vec!["A) 1".into(), "B) 2".into()])
        );

        let free: Problem =
            serde_json::from_str(r#"{"id": "p2", "text": "Solve", "choices": "주관식"}"#).unwrap();
        assert_eq!(free.problem_id.as_str(), "p2");
        assert!(free.choices.is_free_response());
    }

    #[test]
    fn stored_document_with_both_ids_prefers_problem_id() {
        let problem: Problem = serde_json::from_str(
            r#"{"problem_id": "p1", "text_latex": "$1+1$", "choices": ["A) 1", "B) 2"], "id": "doc-9"}"#,
        )
        .unwrap();
        assert_eq!(problem.problem_id.as_str(), "p1");
        assert_eq!(problem.text_latex, "$1+1$");

        let list: Vec<Problem> = serde_json::from_str(
            r#"[{"problem_id": "p1", "id": "p1", "choices": "free"}, {"id": "p2", "choices": null}]"#,
        )
        .unwrap();
        assert_eq!(list[1].problem_id.as_str(), "p2");
        assert!(list[1].choices.is_free_response());
    }

    #[test]
    fn problem_without_any_id_is_rejected() {
        let err = serde_json::from_str::<Problem>(r#"{"text_latex": "$x$"}"#).unwrap_err();
        assert!(err.to_string().contains("problem_id"));
    }

    #[test]
    fn option_value_takes_leading_letter() {
        assert_eq!(ProblemChoices::option_value("C) $x = 4$"), "C");
        assert_eq!(ProblemChoices::option_value("42"), "42");
        assert_eq!(ProblemChoices::option_value("E) out of range"), "E) out of range");
    }
}
