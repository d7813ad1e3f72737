//! crates/finbuddy_core/src/quiz.rs
//!
//! The quiz session controller. A session moves between three phases:
//! browsing the quiz list, taking one attempt (with a question cursor and one
//! answer slot per question), and showing the server's scored report.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{LifeStage, Question, Quiz, QuizResult, SessionId};
use crate::notify::{Notification, Notifier};
use crate::ports::{ContentGateway, PortError};

/// Wire value of an unanswered slot in the answer buffer.
pub const UNANSWERED: i64 = -1;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("No quiz is in progress")]
    NotInProgress,
    #[error("Quiz {0} has no questions")]
    EmptyQuiz(String),
    #[error("No quiz at position {0}")]
    NoSuchQuiz(usize),
    #[error("Option {index} is out of range for a question with {count} options")]
    OptionOutOfRange { index: usize, count: usize },
    #[error("Question at index {0} has not been answered")]
    Unanswered(usize),
    #[error("Quiz submission failed: {0}")]
    Submit(#[from] PortError),
}

//=========================================================================================
// Quiz Attempt
//=========================================================================================

/// The ephemeral state of one attempt. Dropped on exit or when a new quiz
/// starts; never resumable.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    quiz: Quiz,
    cursor: usize,
    answers: Vec<Option<usize>>,
    result: Option<QuizResult>,
}

impl QuizAttempt {
    fn new(quiz: Quiz) -> Self {
        let answers = vec![None; quiz.questions.len()];
        Self {
            quiz,
            cursor: 0,
            answers,
            result: None,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn question_count(&self) -> usize {
        self.quiz.questions.len()
    }

    fn last_index(&self) -> usize {
        self.question_count().saturating_sub(1)
    }

    pub fn is_last_question(&self) -> bool {
        self.cursor == self.last_index()
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.cursor]
    }

    /// The option recorded for the current question, if any.
    pub fn selected(&self) -> Option<usize> {
        self.answers[self.cursor]
    }

    pub fn answer_at(&self, question: usize) -> Option<usize> {
        self.answers.get(question).copied().flatten()
    }

    /// The answer buffer as sent on the wire: one slot per question,
    /// `UNANSWERED` for questions without a selection.
    pub fn answer_buffer(&self) -> Vec<i64> {
        self.answers
            .iter()
            .map(|slot| slot.map_or(UNANSWERED, |index| index as i64))
            .collect()
    }

    /// Whether the "Next" (or, on the last question, "Submit") control is enabled.
    pub fn can_advance(&self) -> bool {
        self.selected().is_some()
    }

    /// Fraction of the quiz reached, `(cursor + 1) / question_count`.
    pub fn progress(&self) -> f64 {
        (self.cursor + 1) as f64 / self.question_count() as f64
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }
}

//=========================================================================================
// Quiz Session
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum QuizPhase {
    Browsing,
    InProgress(QuizAttempt),
    Results(QuizAttempt),
}

/// What `next` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    Advanced(usize),
    Submitted,
}

pub struct QuizSession {
    gateway: Arc<dyn ContentGateway>,
    session_id: SessionId,
    notifier: Notifier,
    quizzes: Vec<Quiz>,
    loaded_stage: Option<LifeStage>,
    loading: bool,
    phase: QuizPhase,
}

impl QuizSession {
    pub fn new(gateway: Arc<dyn ContentGateway>, session_id: SessionId, notifier: Notifier) -> Self {
        Self {
            gateway,
            session_id,
            notifier,
            quizzes: Vec::new(),
            loaded_stage: None,
            loading: false,
            phase: QuizPhase::Browsing,
        }
    }

    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    /// The attempt being taken, or the one whose results are shown.
    pub fn attempt(&self) -> Option<&QuizAttempt> {
        match &self.phase {
            QuizPhase::Browsing => None,
            QuizPhase::InProgress(attempt) | QuizPhase::Results(attempt) => Some(attempt),
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            QuizPhase::Results(attempt) => attempt.result(),
            _ => None,
        }
    }

    /// Fetches the quiz list when the stage changed since the last successful
    /// load. A failure falls back to an empty list.
    pub async fn load(&mut self, stage: LifeStage) {
        if self.loaded_stage == Some(stage) {
            return;
        }
        self.loading = true;
        match self.gateway.get_quizzes(stage).await {
            Ok(quizzes) => {
                info!("Loaded {} quizzes for stage {}.", quizzes.len(), stage);
                self.quizzes = quizzes;
                self.loaded_stage = Some(stage);
            }
            Err(e) => {
                error!("Failed to load quizzes for stage {}: {}", stage, e);
                self.quizzes.clear();
                self.loaded_stage = None;
            }
        }
        self.loading = false;
    }

    /// Begins a fresh attempt, discarding any previous attempt or result.
    pub fn start(&mut self, quiz: Quiz) -> Result<(), QuizError> {
        if quiz.questions.is_empty() {
            return Err(QuizError::EmptyQuiz(quiz.id));
        }
        info!("Starting quiz {} ({} questions).", quiz.id, quiz.questions.len());
        self.phase = QuizPhase::InProgress(QuizAttempt::new(quiz));
        Ok(())
    }

    /// Starts the quiz at `position` in the loaded list.
    pub fn start_at(&mut self, position: usize) -> Result<(), QuizError> {
        let quiz = self
            .quizzes
            .get(position)
            .cloned()
            .ok_or(QuizError::NoSuchQuiz(position))?;
        self.start(quiz)
    }

    fn in_progress_mut(&mut self) -> Result<&mut QuizAttempt, QuizError> {
        match &mut self.phase {
            QuizPhase::InProgress(attempt) => Ok(attempt),
            _ => Err(QuizError::NotInProgress),
        }
    }

    /// Records `index` as the answer to the current question, replacing any
    /// earlier choice.
    pub fn select_answer(&mut self, index: usize) -> Result<(), QuizError> {
        let attempt = self.in_progress_mut()?;
        let count = attempt.current_question().options.len();
        if index >= count {
            return Err(QuizError::OptionOutOfRange { index, count });
        }
        let cursor = attempt.cursor;
        attempt.answers[cursor] = Some(index);
        Ok(())
    }

    /// Moves back one question. Answers already given are kept.
    pub fn prev(&mut self) -> bool {
        match self.in_progress_mut() {
            Ok(attempt) if attempt.cursor > 0 => {
                attempt.cursor -= 1;
                true
            }
            _ => false,
        }
    }

    /// Advances to the next question; on the last question this submits.
    /// Refused while the current question is unanswered.
    pub async fn next(&mut self) -> Result<NextOutcome, QuizError> {
        let attempt = self.in_progress_mut()?;
        if !attempt.can_advance() {
            return Err(QuizError::Unanswered(attempt.cursor));
        }
        if attempt.is_last_question() {
            self.submit().await?;
            return Ok(NextOutcome::Submitted);
        }
        attempt.cursor += 1;
        Ok(NextOutcome::Advanced(attempt.cursor))
    }

    /// Sends the answer buffer for scoring.
    ///
    /// On success the result is stored verbatim and the session moves to
    /// `Results`. On failure the attempt stays in progress with its cursor and
    /// answers intact so the user can retry.
    pub async fn submit(&mut self) -> Result<(), QuizError> {
        let (quiz_id, answers) = {
            let attempt = self.in_progress_mut()?;
            if let Some(missing) = attempt.answers.iter().position(Option::is_none) {
                return Err(QuizError::Unanswered(missing));
            }
            (attempt.quiz.id.clone(), attempt.answer_buffer())
        };

        let result = match self
            .gateway
            .submit_quiz(&quiz_id, &self.session_id, &answers)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to submit quiz {}: {}", quiz_id, e);
                return Err(QuizError::Submit(e));
            }
        };

        info!(
            "Quiz {} scored {}% ({}/{}), passed: {}.",
            quiz_id, result.score, result.correct_answers, result.total_questions, result.passed
        );

        let mut attempt = match std::mem::replace(&mut self.phase, QuizPhase::Browsing) {
            QuizPhase::InProgress(attempt) => attempt,
            other => {
                warn!("Quiz {} left the in-progress phase during submission.", quiz_id);
                self.phase = other;
                return Err(QuizError::NotInProgress);
            }
        };

        self.notifier.emit(Notification::QuizSubmitted {
            quiz_id,
            passed: result.passed,
            xp_earned: result.xp_earned,
            new_badges: result.new_badges.clone(),
        });
        attempt.result = Some(result);
        self.phase = QuizPhase::Results(attempt);
        Ok(())
    }

    /// Returns to the quiz list, dropping the attempt and any result.
    pub fn exit(&mut self) {
        if !matches!(self.phase, QuizPhase::Browsing) {
            info!("Leaving quiz attempt; attempt state discarded.");
        }
        self.phase = QuizPhase::Browsing;
    }
}
