use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

use crate::model::ids::UserId;
use crate::model::question::Difficulty;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserContextError {
    #[error("unsupported grade: {0} (expected G7..G12)")]
    InvalidGrade(String),
    #[error("curriculum system must not be blank")]
    BlankSystem,
}

//
// ─── GRADE ────────────────────────────────────────────────────────────────────
//

/// School grade offered at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    G7,
    G8,
    G9,
    G10,
    G11,
    G12,
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::G7,
        Grade::G8,
        Grade::G9,
        Grade::G10,
        Grade::G11,
        Grade::G12,
    ];

    /// Wire code sent to the backend (`G9`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Grade::G7 => "G7",
            Grade::G8 => "G8",
            Grade::G9 => "G9",
            Grade::G10 => "G10",
            Grade::G11 => "G11",
            Grade::G12 => "G12",
        }
    }

    /// US grade and the matching UK year.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Grade::G7 => "Grade 7 / Year 8",
            Grade::G8 => "Grade 8 / Year 9",
            Grade::G9 => "Grade 9 / Year 10",
            Grade::G10 => "Grade 10 / Year 11",
            Grade::G11 => "Grade 11 / Year 12",
            Grade::G12 => "Grade 12 / Year 13",
        }
    }
}

impl FromStr for Grade {
    type Err = UserContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('G')
            .or_else(|| trimmed.strip_prefix('g'))
            .unwrap_or(trimmed);
        match digits {
            "7" => Ok(Grade::G7),
            "8" => Ok(Grade::G8),
            "9" => Ok(Grade::G9),
            "10" => Ok(Grade::G10),
            "11" => Ok(Grade::G11),
            "12" => Ok(Grade::G12),
            _ => Err(UserContextError::InvalidGrade(s.to_owned())),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//
// ─── CURRICULUM SYSTEM ────────────────────────────────────────────────────────
//

/// Curriculum the test taker follows; decides the backend question pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurriculumSystem {
    Us,
    Uk,
    Other(String),
}

impl CurriculumSystem {
    /// Category name the backend filters questions by.
    #[must_use]
    pub fn curriculum_category(&self) -> &'static str {
        match self {
            CurriculumSystem::Us => "Common Core",
            CurriculumSystem::Uk => "IGCSE",
            CurriculumSystem::Other(_) => "General",
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            CurriculumSystem::Us => "US",
            CurriculumSystem::Uk => "UK",
            CurriculumSystem::Other(raw) => raw,
        }
    }
}

impl FromStr for CurriculumSystem {
    type Err = UserContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(UserContextError::BlankSystem);
        }
        Ok(match trimmed.to_ascii_uppercase().as_str() {
            "US" => CurriculumSystem::Us,
            "UK" => CurriculumSystem::Uk,
            _ => CurriculumSystem::Other(trimmed.to_owned()),
        })
    }
}

//
// ─── USER CONTEXT ─────────────────────────────────────────────────────────────
//

/// Onboarding answers used to build the start-test request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: UserId,
    pub grade: Grade,
    pub system: CurriculumSystem,
    pub target_difficulty: Option<Difficulty>,
    pub topic: Option<String>,
}

impl UserContext {
    #[must_use]
    pub fn new(user_id: UserId, grade: Grade, system: CurriculumSystem) -> Self {
        Self {
            user_id,
            grade,
            system,
            target_difficulty: None,
            topic: None,
        }
    }

    /// Context for an anonymous test taker with a fresh `guest_` id.
    #[must_use]
    pub fn guest(grade: Grade, system: CurriculumSystem) -> Self {
        Self::new(guest_user_id(), grade, system)
    }

    #[must_use]
    pub fn with_target_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.target_difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

/// `guest_` followed by nine lowercase alphanumerics.
#[must_use]
pub fn guest_user_id() -> UserId {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    UserId::new(format!("guest_{suffix}"))
}
