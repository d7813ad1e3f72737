pub mod chat;
pub mod domain;
pub mod input;
pub mod markup;
pub mod modules;
pub mod navigator;
pub mod notify;
pub mod ports;
pub mod profile;
pub mod quiz;

pub use chat::{ChatSession, FALLBACK_REPLY};
pub use domain::{
    Badge, ChatExchange, ChatRole, ChatTurn, LifeStage, Module, ModuleCompletion, Profile,
    Question, QuestionResult, Quiz, QuizResult, SessionId,
};
pub use navigator::{NavAction, Navigator, View};
pub use notify::{Notification, Notifier};
pub use ports::{ContentGateway, PortError, PortResult};
pub use quiz::{NextOutcome, QuizError, QuizPhase, QuizSession};
