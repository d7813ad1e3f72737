//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `ContentGateway` port from the `core` crate. It speaks JSON to the
//! FinBuddy service using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use finbuddy_core::domain::{
    Badge, ChatExchange, LifeStage, Module, ModuleCompletion, Profile, Question, QuestionResult,
    Quiz, QuizResult, SessionId,
};
use finbuddy_core::ports::{ContentGateway, PortError, PortResult};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A gateway adapter that implements the `ContentGateway` port over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Creates a new `HttpGateway`. `base_url` points at the service's API root.
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and decodes its JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> PortResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        let status = response.status();
        let url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        debug!("{} -> {}", url, status);

        if status == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "{} returned {}: {}",
                url.path(),
                status,
                body
            )));
        }
        serde_json::from_str(&body).map_err(|e| PortError::Decode(format!("{}: {}", url.path(), e)))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> PortResult<T> {
        let url = self.endpoint(segments)?;
        self.execute(self.client.get(url).query(query)).await
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct MessageRecord {
    message: String,
}

#[derive(Deserialize)]
struct ChatRecord {
    message: String,
    response: String,
    #[serde(default)]
    timestamp: Option<String>,
}
impl ChatRecord {
    fn to_domain(self) -> ChatExchange {
        ChatExchange {
            message: self.message,
            response: self.response,
            timestamp: self.timestamp.as_deref().and_then(parse_timestamp),
        }
    }
}

/// The service emits naive UTC timestamps; RFC 3339 is accepted as well.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            raw.parse::<NaiveDateTime>()
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    message: &'a str,
    user_stage: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct ModuleRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    estimated_time: u32,
    #[serde(default)]
    xp_reward: u32,
    #[serde(default)]
    order_index: i32,
}
impl ModuleRecord {
    fn to_domain(self) -> Module {
        Module {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            difficulty: self.difficulty,
            category: self.category,
            estimated_minutes: self.estimated_time,
            xp_reward: self.xp_reward,
            order_index: self.order_index,
        }
    }
}

/// A repeat completion only carries `message`; the other fields are absent.
#[derive(Deserialize)]
struct CompletionRecord {
    #[serde(default)]
    xp_earned: u32,
    #[serde(default)]
    new_badges: Vec<String>,
    #[serde(default)]
    new_level: Option<u32>,
}
impl CompletionRecord {
    fn to_domain(self) -> ModuleCompletion {
        ModuleCompletion {
            xp_earned: self.xp_earned,
            new_badges: self.new_badges,
            new_level: self.new_level,
        }
    }
}

#[derive(Deserialize)]
struct ProfileRecord {
    #[serde(default = "first_level")]
    level: u32,
    #[serde(default)]
    total_xp: u32,
    #[serde(default)]
    streak_count: u32,
    #[serde(default)]
    max_streak: u32,
    #[serde(default)]
    total_questions: u32,
    #[serde(default)]
    badges: Vec<String>,
    #[serde(default)]
    modules_completed: Vec<String>,
    #[serde(default)]
    quiz_scores: HashMap<String, u32>,
    #[serde(default)]
    user_stage: Option<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            level: self.level,
            total_xp: self.total_xp,
            current_streak: self.streak_count,
            max_streak: self.max_streak,
            total_questions: self.total_questions,
            badges: self.badges,
            modules_completed: self.modules_completed,
            quiz_scores: self.quiz_scores,
            stage: self.user_stage.and_then(|s| s.parse().ok()),
        }
    }
}

fn first_level() -> u32 {
    1
}

#[derive(Deserialize)]
struct QuestionRecord {
    question: String,
    options: Vec<String>,
}

#[derive(Deserialize)]
struct QuizRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    passing_score: u32,
    #[serde(default)]
    xp_reward: u32,
    questions: Vec<QuestionRecord>,
}
impl QuizRecord {
    fn to_domain(self) -> Quiz {
        Quiz {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            passing_score: self.passing_score,
            xp_reward: self.xp_reward,
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.question,
                    options: q.options,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct QuizSubmission<'a> {
    session_id: &'a str,
    quiz_id: &'a str,
    answers: &'a [i64],
}

#[derive(Deserialize)]
struct QuestionResultRecord {
    question: String,
    your_answer: String,
    correct_answer: String,
    is_correct: bool,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct QuizResultRecord {
    score: u32,
    total_questions: u32,
    correct_answers: u32,
    passed: bool,
    xp_earned: u32,
    #[serde(default)]
    results: Vec<QuestionResultRecord>,
    #[serde(default)]
    new_badges: Vec<String>,
}
impl QuizResultRecord {
    fn to_domain(self) -> QuizResult {
        QuizResult {
            passed: self.passed,
            score: self.score,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions,
            xp_earned: self.xp_earned,
            new_badges: self.new_badges,
            results: self
                .results
                .into_iter()
                .map(|r| QuestionResult {
                    question: r.question,
                    your_answer: r.your_answer,
                    correct_answer: r.correct_answer,
                    is_correct: r.is_correct,
                    explanation: r.explanation.filter(|e| !e.trim().is_empty()),
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct BadgeRecord {
    id: String,
    name: String,
    description: String,
    icon: String,
    #[serde(default)]
    requirement: String,
    #[serde(default)]
    xp_reward: u32,
}
impl BadgeRecord {
    fn to_domain(self) -> Badge {
        Badge {
            id: self.id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            xp_reward: self.xp_reward,
            requirement: self.requirement,
        }
    }
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl ContentGateway for HttpGateway {
    async fn ping(&self) -> PortResult<String> {
        let record: MessageRecord = self.get(&[""], &[]).await?;
        Ok(record.message)
    }

    async fn get_chat_history(&self, session_id: &SessionId) -> PortResult<Vec<ChatExchange>> {
        let records: Vec<ChatRecord> = self
            .get(&["chat", "history", session_id.as_str()], &[])
            .await?;
        Ok(records.into_iter().map(ChatRecord::to_domain).collect())
    }

    async fn post_chat_message(
        &self,
        session_id: &SessionId,
        message: &str,
        stage: LifeStage,
    ) -> PortResult<String> {
        let url = self.endpoint(&["chat"])?;
        let body = ChatRequest {
            session_id: session_id.as_str(),
            message,
            user_stage: stage.as_str(),
        };
        let reply: ChatReply = self.execute(self.client.post(url).json(&body)).await?;
        Ok(reply.response)
    }

    async fn get_modules(&self, stage: LifeStage) -> PortResult<Vec<Module>> {
        let records: Vec<ModuleRecord> = self
            .get(&["modules"], &[("user_stage", stage.as_str())])
            .await?;
        Ok(records.into_iter().map(ModuleRecord::to_domain).collect())
    }

    async fn complete_module(
        &self,
        module_id: &str,
        session_id: &SessionId,
    ) -> PortResult<ModuleCompletion> {
        let url = self.endpoint(&["modules", module_id, "complete"])?;
        let request = self
            .client
            .post(url)
            .query(&[("session_id", session_id.as_str())]);
        let record: CompletionRecord = self.execute(request).await?;
        Ok(record.to_domain())
    }

    async fn get_profile(&self, session_id: &SessionId) -> PortResult<Option<Profile>> {
        let record: Option<ProfileRecord> =
            self.get(&["profile", session_id.as_str()], &[]).await?;
        Ok(record.map(ProfileRecord::to_domain))
    }

    async fn update_stage(&self, session_id: &SessionId, stage: LifeStage) -> PortResult<()> {
        let url = self.endpoint(&["profile", "update-stage"])?;
        let request = self.client.post(url).query(&[
            ("session_id", session_id.as_str()),
            ("user_stage", stage.as_str()),
        ]);
        let _: MessageRecord = self.execute(request).await?;
        Ok(())
    }

    async fn get_quizzes(&self, stage: LifeStage) -> PortResult<Vec<Quiz>> {
        let records: Vec<QuizRecord> = self
            .get(&["quizzes"], &[("user_stage", stage.as_str())])
            .await?;
        Ok(records.into_iter().map(QuizRecord::to_domain).collect())
    }

    async fn submit_quiz(
        &self,
        quiz_id: &str,
        session_id: &SessionId,
        answers: &[i64],
    ) -> PortResult<QuizResult> {
        let url = self.endpoint(&["quizzes", quiz_id, "submit"])?;
        let body = QuizSubmission {
            session_id: session_id.as_str(),
            quiz_id,
            answers,
        };
        let record: QuizResultRecord = self.execute(self.client.post(url).json(&body)).await?;
        Ok(record.to_domain())
    }

    async fn get_badges(&self) -> PortResult<Vec<Badge>> {
        let records: Vec<BadgeRecord> = self.get(&["badges"], &[]).await?;
        Ok(records.into_iter().map(BadgeRecord::to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn endpoints_append_encoded_segments() {
        for base in ["http://localhost:8001/api", "http://localhost:8001/api/"] {
            let gw = gateway(base);
            assert_eq!(
                gw.endpoint(&["chat", "history", "session_1"]).unwrap().as_str(),
                "http://localhost:8001/api/chat/history/session_1"
            );
            assert_eq!(gw.endpoint(&[""]).unwrap().as_str(), "http://localhost:8001/api/");
        }
        assert_eq!(
            gateway("http://h/api").endpoint(&["modules", "a b", "complete"]).unwrap().as_str(),
            "http://h/api/modules/a%20b/complete"
        );
    }

    #[test]
    fn history_records_keep_order_and_parse_naive_timestamps() {
        let records: Vec<ChatRecord> = serde_json::from_value(json!([
            {"id": "1", "session_id": "s", "message": "q1", "response": "a1",
             "timestamp": "2024-05-01T10:15:30.123456", "user_stage": "student"},
            {"id": "2", "session_id": "s", "message": "q2", "response": "a2",
             "timestamp": "2024-05-01T10:16:00Z"},
        ]))
        .unwrap();
        let exchanges: Vec<_> = records.into_iter().map(ChatRecord::to_domain).collect();

        assert_eq!(exchanges[0].message, "q1");
        assert_eq!(exchanges[1].response, "a2");
        assert!(exchanges.iter().all(|e| e.timestamp.is_some()));
    }

    #[test]
    fn repeat_completion_reply_decodes_with_zero_xp() {
        let record: CompletionRecord =
            serde_json::from_value(json!({"message": "Module already completed"})).unwrap();
        assert_eq!(record.to_domain(), ModuleCompletion::default());

        let record: CompletionRecord = serde_json::from_value(json!({
            "message": "Module completed successfully",
            "xp_earned": 20, "new_badges": ["module_explorer"], "new_level": 2
        }))
        .unwrap();
        let completion = record.to_domain();
        assert_eq!(completion.xp_earned, 20);
        assert_eq!(completion.new_level, Some(2));
    }

    #[test]
    fn null_profile_is_absent() {
        let record: Option<ProfileRecord> = serde_json::from_value(json!(null)).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn profile_maps_streak_and_stage() {
        let record: ProfileRecord = serde_json::from_value(json!({
            "id": "p", "session_id": "s", "user_stage": "retiree",
            "streak_count": 3, "max_streak": 7, "total_questions": 12,
            "total_xp": 180, "level": 3, "badges": ["streak_3"],
            "modules_completed": ["m1"], "quiz_scores": {"q1": 80},
            "last_activity": "2024-05-01T10:15:30", "created_at": "2024-04-01T10:15:30"
        }))
        .unwrap();
        let profile = record.to_domain();
        assert_eq!(profile.current_streak, 3);
        assert_eq!(profile.max_streak, 7);
        assert_eq!(profile.stage, Some(LifeStage::Retiree));
        assert_eq!(profile.quiz_scores.get("q1"), Some(&80));
    }

    #[test]
    fn quiz_questions_map_without_answers() {
        let record: QuizRecord = serde_json::from_value(json!({
            "id": "q1", "title": "Credit", "description": "d", "category": "credit",
            "user_stage": "general", "passing_score": 70, "xp_reward": 25,
            "questions": [{"question": "Biggest factor?", "options": ["A", "B"]}]
        }))
        .unwrap();
        let quiz = record.to_domain();
        assert_eq!(quiz.questions[0].prompt, "Biggest factor?");
        assert_eq!(quiz.questions[0].options, vec!["A", "B"]);
    }

    #[test]
    fn submission_serializes_answer_buffer() {
        let body = QuizSubmission {
            session_id: "s",
            quiz_id: "q1",
            answers: &[1, 0, 2],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"session_id": "s", "quiz_id": "q1", "answers": [1, 0, 2]})
        );
    }

    #[test]
    fn blank_explanations_are_dropped() {
        let record: QuizResultRecord = serde_json::from_value(json!({
            "score": 50, "total_questions": 2, "correct_answers": 1, "passed": false,
            "xp_earned": 12, "new_badges": [],
            "results": [
                {"question": "a", "your_answer": "x", "correct_answer": "x", "is_correct": true, "explanation": ""},
                {"question": "b", "your_answer": "No answer", "correct_answer": "y", "is_correct": false, "explanation": "Because."}
            ]
        }))
        .unwrap();
        let result = record.to_domain();
        assert_eq!(result.results[0].explanation, None);
        assert_eq!(result.results[1].explanation.as_deref(), Some("Because."));
        assert!(!result.passed);
    }
}
