mod answer;
mod context;
mod ids;
mod nullable;
mod problem;
mod question;
mod results;

pub use ids::{ChoiceId, ParseIdError, ProblemId, QuestionId, SessionId, UserId};

pub use answer::Answer;
pub use context::{CurriculumSystem, Grade, UserContext, UserContextError, guest_user_id};
pub use problem::{AnalysisReport, GradedProblem, Problem, ProblemAnswer, ProblemChoices};
pub use question::{Choice, Difficulty, Question};
pub use results::{AnswerHistoryItem, TestResults, TopicAnalysis};
