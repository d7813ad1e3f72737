//! crates/finbuddy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any transport or serialization format;
//! adapters convert their own wire records into these types.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Session Identity
//=========================================================================================

/// Opaque correlation key shared with the remote service for one client lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh identifier. Called once per client instantiation.
    pub fn generate() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Life Stage
//=========================================================================================

/// The user-selected cohort tag. The client only forwards it to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifeStage {
    Student,
    EarlyCareer,
    Retiree,
    General,
}

impl LifeStage {
    /// All stages, in the order they are offered on the stage-select screen.
    pub const ALL: [LifeStage; 4] = [
        LifeStage::Student,
        LifeStage::EarlyCareer,
        LifeStage::Retiree,
        LifeStage::General,
    ];

    /// The wire value understood by the remote service.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStage::Student => "student",
            LifeStage::EarlyCareer => "early_career",
            LifeStage::Retiree => "retiree",
            LifeStage::General => "general",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifeStage::Student => "Student",
            LifeStage::EarlyCareer => "Early Career",
            LifeStage::Retiree => "Retiree",
            LifeStage::General => "General Learner",
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown life stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for LifeStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "student" => Ok(LifeStage::Student),
            "early_career" => Ok(LifeStage::EarlyCareer),
            "retiree" => Ok(LifeStage::Retiree),
            "general" => Ok(LifeStage::General),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the transcript. `at` is only known for turns rebuilt from
/// server history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: Option<DateTime<Utc>>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            at: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            at: None,
        }
    }

    pub fn stamped(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.at = at;
        self
    }
}

/// A single stored question-and-reply record from the server's chat history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub message: String,
    pub response: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatExchange {
    /// Expands the record into its two transcript turns, user first. Both
    /// carry the record's timestamp.
    pub fn into_turns(self) -> [ChatTurn; 2] {
        [
            ChatTurn::user(self.message).stamped(self.timestamp),
            ChatTurn::assistant(self.response).stamped(self.timestamp),
        ]
    }
}

//=========================================================================================
// Learning Modules
//=========================================================================================

/// A learning module. Completion status is deliberately absent; see
/// `modules::is_completed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub difficulty: String,
    pub category: String,
    pub estimated_minutes: u32,
    pub xp_reward: u32,
    pub order_index: i32,
}

/// The server's answer to a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleCompletion {
    pub xp_earned: u32,
    pub new_badges: Vec<String>,
    pub new_level: Option<u32>,
}

//=========================================================================================
// Quizzes
//=========================================================================================

/// A quiz question as seen by the client. The correct answer is never sent
/// before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub passing_score: u32,
    pub xp_reward: u32,
    pub questions: Vec<Question>,
}

/// Per-question outcome inside a `QuizResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

/// The scored report returned by the server. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub passed: bool,
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub xp_earned: u32,
    pub new_badges: Vec<String>,
    pub results: Vec<QuestionResult>,
}

//=========================================================================================
// Profile & Badges
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    pub level: u32,
    pub total_xp: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub total_questions: u32,
    pub badges: Vec<String>,
    pub modules_completed: Vec<String>,
    pub quiz_scores: HashMap<String, u32>,
    pub stage: Option<LifeStage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: u32,
    pub requirement: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stage_parses_wire_and_display_forms() {
        assert_eq!("early_career".parse::<LifeStage>(), Ok(LifeStage::EarlyCareer));
        assert_eq!("Early Career".parse::<LifeStage>(), Ok(LifeStage::EarlyCareer));
        assert_eq!(" RETIREE ".parse::<LifeStage>(), Ok(LifeStage::Retiree));
        assert!("pensioner".parse::<LifeStage>().is_err());
    }

    #[test]
    fn stage_round_trips_through_wire_value() {
        for stage in LifeStage::ALL {
            assert_eq!(stage.as_str().parse::<LifeStage>(), Ok(stage));
        }
    }

    #[test]
    fn exchange_expands_user_then_assistant() {
        let exchange = ChatExchange {
            message: "What is an index fund?".into(),
            response: "A fund that tracks an index.".into(),
            timestamp: None,
        };
        let [first, second] = exchange.into_turns();
        assert_eq!(first, ChatTurn::user("What is an index fund?"));
        assert_eq!(second, ChatTurn::assistant("A fund that tracks an index."));
    }

    #[test]
    fn exchange_timestamp_lands_on_both_turns() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30).single();
        let exchange = ChatExchange {
            message: "Should I save?".into(),
            response: "Yes.".into(),
            timestamp: at,
        };
        let [first, second] = exchange.into_turns();
        assert_eq!(first.at, at);
        assert_eq!(second.at, at);
        assert_eq!(ChatTurn::user("local").at, None);
    }

    #[test]
    fn generated_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
