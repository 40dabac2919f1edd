//! Plain-text rendering of session state. Every function is a pure view over
//! borrowed state; nothing here mutates a session.

use std::io::{self, Write};

use mathiter_core::model::{AnalysisReport, ProblemChoices, Question, TestResults};
use mathiter_core::session::TimerView;
use mathiter_core::{LegacyPhase, LegacyRun, SessionPhase, SessionSnapshot, TimerLevel};

/// Letter shown next to the choice at `index` (`a`, `b`, ...).
#[must_use]
pub fn choice_key(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| char::from(b'a' + i))
}

/// Inverse of [`choice_key`].
#[must_use]
pub fn choice_index(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

pub fn render_timer(out: &mut impl Write, timer: &TimerView) -> io::Result<()> {
    let marker = match timer.level {
        TimerLevel::Normal => "",
        TimerLevel::Warning => " (hurry up)",
        TimerLevel::Danger if timer.state.is_overtime => " (overtime)",
        TimerLevel::Danger => " (almost out of time)",
    };
    writeln!(out, "[time {}{marker}]", timer.display)
}

pub fn render_session(out: &mut impl Write, snapshot: &SessionSnapshot<'_>) -> io::Result<()> {
    match snapshot.phase {
        SessionPhase::Idle => writeln!(out, "No test in progress.")?,
        SessionPhase::Starting => writeln!(out, "Starting test...")?,
        SessionPhase::Submitting => writeln!(out, "Checking answer...")?,
        SessionPhase::Answering => {
            let progress = snapshot.progress;
            writeln!(
                out,
                "Question {} of {} ({}%)",
                progress.position(),
                progress.total,
                progress.percent()
            )?;
            render_timer(out, &snapshot.timer)?;
            if let Some(question) = snapshot.current_question {
                render_question(out, question, snapshot.selection.map(|c| c.as_str()))?;
            }
        }
        SessionPhase::Finished => match snapshot.results {
            Some(results) => render_results(out, results)?,
            None => writeln!(out, "Test finished.")?,
        },
    }
    if let Some(message) = snapshot.last_error {
        writeln!(out, "! {message}")?;
    }
    Ok(())
}

fn render_question(out: &mut impl Write, question: &Question, selected: Option<&str>) -> io::Result<()> {
    writeln!(out, "{} / {}", question.topic(), question.difficulty())?;
    writeln!(out, "{}", question.text())?;
    for (index, choice) in question.choices().iter().enumerate() {
        let mark = if selected == Some(choice.id.as_str()) { '*' } else { ' ' };
        writeln!(out, " {mark}{}) {}", choice_key(index), choice.text)?;
    }
    Ok(())
}

pub fn render_results(out: &mut impl Write, results: &TestResults) -> io::Result<()> {
    writeln!(
        out,
        "Score: {}/{} ({}%)",
        results.score, results.total, results.score_percent
    )?;
    if !results.recommendation_text.is_empty() {
        writeln!(out, "{}", results.recommendation_text)?;
    }
    if !results.recommended_course.is_empty() {
        writeln!(
            out,
            "Next: {} - {}",
            results.recommended_course, results.recommended_module
        )?;
    }
    for topic in &results.topic_analysis {
        writeln!(out, "  {:<20} {:>3}% of {}", topic.topic, topic.accuracy, topic.total)?;
    }
    for item in results.incorrect() {
        writeln!(out, "x {} ({})", item.question_id, item.topic)?;
        if let Some(explanation) = &item.explanation {
            writeln!(out, "    {explanation}")?;
        }
    }
    Ok(())
}

pub fn render_legacy(out: &mut impl Write, run: &LegacyRun) -> io::Result<()> {
    match run.phase() {
        LegacyPhase::Idle => writeln!(out, "No problem set loaded.")?,
        LegacyPhase::Loading => writeln!(out, "Loading problems...")?,
        LegacyPhase::Submitting => writeln!(out, "Grading answers...")?,
        LegacyPhase::InProgress => {
            render_timer(out, &TimerView::of(run.timer()))?;
            for (index, problem) in run.problems().iter().enumerate() {
                let answer = run.answer_for(&problem.problem_id).unwrap_or("-");
                writeln!(out, "{}. {}  [{answer}]", index + 1, problem.text_latex)?;
                match &problem.choices {
                    ProblemChoices::Options(options) => {
                        for option in options {
                            writeln!(out, "     {option}")?;
                        }
                    }
                    ProblemChoices::FreeResponse(_) => writeln!(out, "     (free response)")?,
                }
            }
        }
        LegacyPhase::Completed => {
            if let Some(report) = run.report() {
                render_report(out, report)?;
            }
        }
    }
    if let Some(message) = run.last_error() {
        writeln!(out, "! {message}")?;
    }
    Ok(())
}

pub fn render_report(out: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
    writeln!(
        out,
        "Correct: {}/{}",
        report.correct_count(),
        report.test_results.len()
    )?;
    for graded in report.test_results.iter().filter(|r| !r.is_correct) {
        writeln!(
            out,
            "x {}: answered {}, expected {}",
            graded.id,
            graded.user_answer.as_deref().unwrap_or("-"),
            graded.correct_answer.as_deref().unwrap_or("?")
        )?;
    }
    if !report.ai_analysis_report.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", report.ai_analysis_report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathiter_core::model::{
        Choice, CurriculumSystem, Difficulty, Grade, QuestionId, SessionId, UserContext, UserId,
    };
    use mathiter_core::session::StartOutcome;
    use mathiter_core::{AdaptiveSession, TimerConfig};

    fn answering() -> AdaptiveSession {
        let mut session = AdaptiveSession::new(TimerConfig::default());
        session
            .begin_start(UserContext::new(
                UserId::new("u-1"),
                Grade::G9,
                CurriculumSystem::Us,
            ))
            .unwrap();
        session
            .complete_start(StartOutcome {
                session_id: SessionId::new("s-1"),
                total_questions: 4,
                first_question: Some(Question::new(
                    QuestionId::new("q1"),
                    "Algebra",
                    Difficulty::Easy,
                    "$2+2$",
                    vec![Choice::new("A", "3"), Choice::new("B", "4")],
                )),
            })
            .unwrap();
        session
    }

    fn text(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn choice_keys_round_trip() {
        assert_eq!(choice_key(0), 'a');
        assert_eq!(choice_key(3), 'd');
        assert_eq!(choice_index("b"), Some(1));
        assert_eq!(choice_index("bb"), None);
        assert_eq!(choice_index("B"), None);
    }

    #[test]
    fn answering_view_shows_question_and_selection() {
        let mut session = answering();
        session.select("B".parse().unwrap()).unwrap();

        let out = text(|buf| render_session(buf, &session.snapshot()));
        assert!(out.contains("Question 1 of 4 (25%)"));
        assert!(out.contains("[time 30:00]"));
        assert!(out.contains("Algebra / Easy"));
        assert!(out.contains("  a) 3"));
        assert!(out.contains(" *b) 4"));
    }

    #[test]
    fn overtime_is_flagged() {
        let mut session = AdaptiveSession::new(TimerConfig::default().with_duration(0));
        session
            .begin_start(UserContext::guest(Grade::G7, CurriculumSystem::Uk))
            .unwrap();
        session
            .complete_start(StartOutcome {
                session_id: SessionId::new("s-2"),
                total_questions: 1,
                first_question: Some(Question::new(
                    QuestionId::new("q1"),
                    "Number",
                    Difficulty::Medium,
                    "$1$",
                    Vec::new(),
                )),
            })
            .unwrap();
        session.tick();

        let out = text(|buf| render_timer(buf, &session.snapshot().timer));
        assert_eq!(out, "[time -00:01 (overtime)]\n");
    }

    #[test]
    fn results_list_misses_with_explanations() {
        let results: TestResults = sample_results();
        let out = text(|buf| render_results(buf, &results));
        assert!(out.contains("Score: 1/2 (50%)"));
        assert!(out.contains("x q2 (Geometry)"));
        assert!(out.contains("    Angles sum to 180."));
        assert!(!out.contains("x q1"));
    }

    fn sample_results() -> TestResults {
        use mathiter_core::model::AnswerHistoryItem;
        TestResults {
            score: 1,
            total: 2,
            score_percent: 50,
            answer_history: vec![
                AnswerHistoryItem {
                    question_id: QuestionId::new("q1"),
                    is_correct: true,
                    difficulty: Difficulty::Easy,
                    topic: "Algebra".into(),
                    explanation: None,
                    text_latex: None,
                },
                AnswerHistoryItem {
                    question_id: QuestionId::new("q2"),
                    is_correct: false,
                    difficulty: Difficulty::Hard,
                    topic: "Geometry".into(),
                    explanation: Some("Angles sum to 180.".into()),
                    text_latex: None,
                },
            ],
            ..TestResults::default()
        }
    }
}
