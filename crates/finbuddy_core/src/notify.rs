//! crates/finbuddy_core/src/notify.rs
//!
//! One-shot celebratory events emitted after a successful mutation
//! (module completion, quiz submission). They are delivered over a channel
//! and never stored by the controllers.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ModuleCompleted {
        module_id: String,
        xp_earned: u32,
        new_badges: Vec<String>,
        new_level: Option<u32>,
    },
    QuizSubmitted {
        quiz_id: String,
        passed: bool,
        xp_earned: u32,
        new_badges: Vec<String>,
    },
}

/// Sending half handed to each controller that can emit notifications.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    sender: Option<UnboundedSender<Notification>>,
}

impl Notifier {
    /// Creates a notifier together with the receiver the front end drains.
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A notifier that drops everything it is given.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn emit(&self, notification: Notification) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(notification).is_err() {
            debug!("Notification receiver dropped; event discarded.");
        }
    }
}
