//! Scripted in-memory gateway shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use finbuddy_core::domain::{
    Badge, ChatExchange, LifeStage, Module, ModuleCompletion, Profile, Question, QuestionResult,
    Quiz, QuizResult, SessionId,
};
use finbuddy_core::ports::{ContentGateway, PortError, PortResult};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    History(String),
    Chat { message: String, stage: LifeStage },
    Modules(LifeStage),
    Complete(String),
    Profile,
    UpdateStage(LifeStage),
    Quizzes(LifeStage),
    Submit { quiz_id: String, answers: Vec<i64> },
    Badges,
}

#[derive(Default)]
pub struct ScriptedGateway {
    pub history: Mutex<Vec<ChatExchange>>,
    pub modules: Mutex<Vec<Module>>,
    pub quizzes: Mutex<Vec<Quiz>>,
    pub badges: Mutex<Vec<Badge>>,
    pub profile: Mutex<Option<Profile>>,
    pub submit_result: Mutex<Option<QuizResult>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation reject until cleared.
    pub fn set_failing(&self, op: &'static str, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(op);
        } else {
            set.remove(op);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, op: &'static str, call: Call) -> PortResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(op) {
            return Err(PortError::Transport(format!("{op} is scripted to fail")));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGateway for ScriptedGateway {
    async fn ping(&self) -> PortResult<String> {
        self.record("ping", Call::Ping)?;
        Ok("FinBuddy API".into())
    }

    async fn get_chat_history(&self, session_id: &SessionId) -> PortResult<Vec<ChatExchange>> {
        self.record("history", Call::History(session_id.to_string()))?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn post_chat_message(
        &self,
        _session_id: &SessionId,
        message: &str,
        stage: LifeStage,
    ) -> PortResult<String> {
        self.record(
            "chat",
            Call::Chat {
                message: message.to_string(),
                stage,
            },
        )?;
        Ok(format!("reply to {message}"))
    }

    async fn get_modules(&self, stage: LifeStage) -> PortResult<Vec<Module>> {
        self.record("modules", Call::Modules(stage))?;
        Ok(self.modules.lock().unwrap().clone())
    }

    async fn complete_module(
        &self,
        module_id: &str,
        _session_id: &SessionId,
    ) -> PortResult<ModuleCompletion> {
        self.record("complete", Call::Complete(module_id.to_string()))?;
        Ok(ModuleCompletion {
            xp_earned: 20,
            new_badges: vec!["module_explorer".into()],
            new_level: Some(2),
        })
    }

    async fn get_profile(&self, _session_id: &SessionId) -> PortResult<Option<Profile>> {
        self.record("profile", Call::Profile)?;
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn update_stage(&self, _session_id: &SessionId, stage: LifeStage) -> PortResult<()> {
        self.record("update_stage", Call::UpdateStage(stage))
    }

    async fn get_quizzes(&self, stage: LifeStage) -> PortResult<Vec<Quiz>> {
        self.record("quizzes", Call::Quizzes(stage))?;
        Ok(self.quizzes.lock().unwrap().clone())
    }

    async fn submit_quiz(
        &self,
        quiz_id: &str,
        _session_id: &SessionId,
        answers: &[i64],
    ) -> PortResult<QuizResult> {
        self.record(
            "submit",
            Call::Submit {
                quiz_id: quiz_id.to_string(),
                answers: answers.to_vec(),
            },
        )?;
        Ok(self
            .submit_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| sample_result(answers.len() as u32)))
    }

    async fn get_badges(&self) -> PortResult<Vec<Badge>> {
        self.record("badges", Call::Badges)?;
        Ok(self.badges.lock().unwrap().clone())
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

pub fn exchange(message: &str, response: &str) -> ChatExchange {
    ChatExchange {
        message: message.into(),
        response: response.into(),
        timestamp: None,
    }
}

pub fn module(id: &str, order_index: i32) -> Module {
    Module {
        id: id.into(),
        title: format!("Module {id}"),
        description: "A module".into(),
        content: "# Heading\n- point".into(),
        difficulty: "beginner".into(),
        category: "budgeting".into(),
        estimated_minutes: 10,
        xp_reward: 20,
        order_index,
    }
}

pub fn quiz(id: &str, option_counts: &[usize]) -> Quiz {
    Quiz {
        id: id.into(),
        title: format!("Quiz {id}"),
        description: "A quiz".into(),
        category: "budgeting".into(),
        passing_score: 70,
        xp_reward: 30,
        questions: option_counts
            .iter()
            .enumerate()
            .map(|(i, &count)| Question {
                prompt: format!("Question {}", i + 1),
                options: (0..count).map(|o| format!("Option {o}")).collect(),
            })
            .collect(),
    }
}

pub fn sample_result(total: u32) -> QuizResult {
    QuizResult {
        passed: true,
        score: 100,
        correct_answers: total,
        total_questions: total,
        xp_earned: 30,
        new_badges: vec!["quiz_master".into()],
        results: (0..total)
            .map(|i| QuestionResult {
                question: format!("Question {}", i + 1),
                your_answer: "Option 0".into(),
                correct_answer: "Option 0".into(),
                is_correct: true,
                explanation: Some("Because.".into()),
            })
            .collect(),
    }
}

pub fn badge(id: &str) -> Badge {
    Badge {
        id: id.into(),
        name: id.into(),
        description: format!("The {id} badge"),
        icon: "*".into(),
        xp_reward: 10,
        requirement: "Do the thing".into(),
    }
}
