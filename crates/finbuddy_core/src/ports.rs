//! crates/finbuddy_core/src/ports.rs
//!
//! Defines the service contract (trait) through which the core talks to the
//! remote FinBuddy service. This trait forms the boundary of the hexagonal
//! architecture, keeping the controllers independent of HTTP or any other
//! transport.

use async_trait::async_trait;

use crate::domain::{
    Badge, ChatExchange, LifeStage, Module, ModuleCompletion, Profile, Quiz, QuizResult,
    SessionId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all gateway operations.
/// This abstracts away the specific errors of the underlying transport.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Remote Content Gateway (Trait)
//=========================================================================================

/// Every operation may reject; callers never assume success.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Returns the service banner. Used as a reachability check at startup.
    async fn ping(&self) -> PortResult<String>;

    // --- Chat ---
    async fn get_chat_history(&self, session_id: &SessionId) -> PortResult<Vec<ChatExchange>>;

    /// Sends one user message and returns the assistant's reply text.
    async fn post_chat_message(
        &self,
        session_id: &SessionId,
        message: &str,
        stage: LifeStage,
    ) -> PortResult<String>;

    // --- Learning Modules ---
    async fn get_modules(&self, stage: LifeStage) -> PortResult<Vec<Module>>;

    async fn complete_module(
        &self,
        module_id: &str,
        session_id: &SessionId,
    ) -> PortResult<ModuleCompletion>;

    // --- Profile ---
    /// `Ok(None)` means the service has no profile for this session yet.
    async fn get_profile(&self, session_id: &SessionId) -> PortResult<Option<Profile>>;

    async fn update_stage(&self, session_id: &SessionId, stage: LifeStage) -> PortResult<()>;

    // --- Quizzes ---
    async fn get_quizzes(&self, stage: LifeStage) -> PortResult<Vec<Quiz>>;

    /// `answers` holds one option index per question, in question order.
    async fn submit_quiz(
        &self,
        quiz_id: &str,
        session_id: &SessionId,
        answers: &[i64],
    ) -> PortResult<QuizResult>;

    // --- Badges ---
    async fn get_badges(&self) -> PortResult<Vec<Badge>>;
}
