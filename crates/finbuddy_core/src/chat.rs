//! crates/finbuddy_core/src/chat.rs
//!
//! The chat session controller. Owns the transcript for the active session,
//! appends the user's turn before the server answers, and guarantees exactly
//! one assistant turn (real or fallback) per user turn.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::{ChatTurn, LifeStage, SessionId};
use crate::input::{ChatInput, KeyOutcome, KeyPress};
use crate::ports::{ContentGateway, PortResult};

/// Assistant turn appended when the chat call fails.
pub const FALLBACK_REPLY: &str = "Sorry, an error occurred. Please try again.";

/// A send that passed the guards and is waiting for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub text: String,
    pub stage: LifeStage,
}

pub struct ChatSession {
    gateway: Arc<dyn ContentGateway>,
    session_id: SessionId,
    transcript: Vec<ChatTurn>,
    pending: bool,
    input: ChatInput,
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn ContentGateway>, session_id: SessionId) -> Self {
        Self {
            gateway,
            session_id,
            transcript: Vec::new(),
            pending: false,
            input: ChatInput::default(),
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn input(&self) -> &ChatInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ChatInput {
        &mut self.input
    }

    /// Replaces the transcript with the server's history for this session.
    ///
    /// A failure leaves the transcript untouched; an empty transcript is a
    /// valid first-use state, so nothing is surfaced to the user.
    pub async fn load_history(&mut self) {
        match self.gateway.get_chat_history(&self.session_id).await {
            Ok(records) => {
                info!(
                    "Loaded {} chat records for session {}.",
                    records.len(),
                    self.session_id
                );
                self.transcript = records
                    .into_iter()
                    .flat_map(|record| record.into_turns())
                    .collect();
            }
            Err(e) => {
                error!(
                    "Failed to load chat history for session {}: {}",
                    self.session_id, e
                );
            }
        }
    }

    /// Applies the guards and the optimistic half of a send.
    ///
    /// Returns `None` (and changes nothing) for blank text or while another
    /// send is outstanding. Otherwise clears the input, appends the user turn
    /// and marks the session pending.
    pub fn begin_send(&mut self, text: &str, stage: LifeStage) -> Option<PendingSend> {
        if text.trim().is_empty() {
            return None;
        }
        if self.pending {
            warn!("Chat send ignored: a reply is still pending.");
            return None;
        }
        self.input.clear();
        self.transcript.push(ChatTurn::user(text));
        self.pending = true;
        Some(PendingSend {
            text: text.to_string(),
            stage,
        })
    }

    /// Records the gateway's answer for the outstanding send.
    pub fn finish_send(&mut self, outcome: PortResult<String>) {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat message failed for session {}: {}", self.session_id, e);
                FALLBACK_REPLY.to_string()
            }
        };
        self.transcript.push(ChatTurn::assistant(reply));
        self.pending = false;
    }

    /// Sends `text` and waits for the reply. Returns whether a send happened.
    pub async fn send(&mut self, text: &str, stage: LifeStage) -> bool {
        let Some(pending) = self.begin_send(text, stage) else {
            return false;
        };
        let outcome = self
            .gateway
            .post_chat_message(&self.session_id, &pending.text, pending.stage)
            .await;
        self.finish_send(outcome);
        true
    }

    /// Feeds one key press into the composer; the commit key triggers `send`.
    /// Committing a blank buffer discards it.
    pub async fn press(&mut self, press: KeyPress, stage: LifeStage) -> bool {
        match self.input.apply(press) {
            KeyOutcome::Submit(text) if text.trim().is_empty() => {
                self.input.clear();
                false
            }
            KeyOutcome::Submit(text) => self.send(&text, stage).await,
            KeyOutcome::Edited => false,
        }
    }
}
