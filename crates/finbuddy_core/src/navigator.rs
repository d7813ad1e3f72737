//! crates/finbuddy_core/src/navigator.rs
//!
//! The top-level view router. It owns every screen controller, holds the
//! session id and the chosen life stage, and applies the legal transitions
//! between the five screens.

use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::chat::ChatSession;
use crate::domain::{LifeStage, SessionId};
use crate::input::KeyPress;
use crate::modules::ModuleBrowser;
use crate::notify::Notifier;
use crate::ports::ContentGateway;
use crate::profile::ProfileView;
use crate::quiz::QuizSession;

//=========================================================================================
// Views and Transitions
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    StageSelect,
    Chat,
    Learning,
    Quiz,
    Profile,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::StageSelect => "stage-select",
            View::Chat => "chat",
            View::Learning => "learning",
            View::Quiz => "quiz",
            View::Profile => "profile",
        }
    }

    /// The transition table. `None` means the action is not legal here.
    pub fn transition(self, action: NavAction) -> Option<View> {
        match (self, action) {
            (_, NavAction::ChangeStage) => Some(View::StageSelect),
            (View::StageSelect, NavAction::SelectStage(_)) => Some(View::Chat),
            (View::Chat, NavAction::ShowLearning) => Some(View::Learning),
            (View::Chat, NavAction::ShowQuiz) => Some(View::Quiz),
            (View::Chat, NavAction::ShowProfile) => Some(View::Profile),
            (View::Learning | View::Quiz | View::Profile, NavAction::Back) => Some(View::Chat),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    SelectStage(LifeStage),
    ShowLearning,
    ShowQuiz,
    ShowProfile,
    Back,
    ChangeStage,
}

//=========================================================================================
// Navigator
//=========================================================================================

pub struct Navigator {
    gateway: Arc<dyn ContentGateway>,
    session_id: SessionId,
    stage: Option<LifeStage>,
    view: View,
    chat: ChatSession,
    modules: ModuleBrowser,
    quiz: QuizSession,
    profile: ProfileView,
}

impl Navigator {
    /// Creates a navigator with a freshly generated session id.
    pub fn new(gateway: Arc<dyn ContentGateway>, notifier: Notifier) -> Self {
        Self::with_session(gateway, SessionId::generate(), notifier)
    }

    pub fn with_session(
        gateway: Arc<dyn ContentGateway>,
        session_id: SessionId,
        notifier: Notifier,
    ) -> Self {
        info!("Client session {} created.", session_id);
        Self {
            chat: ChatSession::new(gateway.clone(), session_id.clone()),
            modules: ModuleBrowser::new(gateway.clone(), session_id.clone(), notifier.clone()),
            quiz: QuizSession::new(gateway.clone(), session_id.clone(), notifier),
            profile: ProfileView::new(gateway.clone(), session_id.clone()),
            gateway,
            session_id,
            stage: None,
            view: View::StageSelect,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn stage(&self) -> Option<LifeStage> {
        self.stage
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatSession {
        &mut self.chat
    }

    pub fn modules(&self) -> &ModuleBrowser {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleBrowser {
        &mut self.modules
    }

    pub fn quiz(&self) -> &QuizSession {
        &self.quiz
    }

    pub fn quiz_mut(&mut self) -> &mut QuizSession {
        &mut self.quiz
    }

    pub fn profile(&self) -> &ProfileView {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileView {
        &mut self.profile
    }

    /// Feeds a key press to the chat composer with the bound life stage.
    /// Returns whether a message was sent. No-op before a stage has been
    /// chosen.
    pub async fn press_chat(&mut self, press: KeyPress) -> bool {
        let Some(stage) = self.stage else {
            warn!("Chat input ignored: no life stage selected.");
            return false;
        };
        self.chat.press(press, stage).await
    }

    /// Applies `action` if it is legal from the current view, running the
    /// entry effects of the target screen. Illegal actions leave the view
    /// unchanged. Returns the resulting view.
    pub async fn dispatch(&mut self, action: NavAction) -> View {
        let Some(target) = self.view.transition(action) else {
            warn!("Ignoring {:?} while on the {} screen.", action, self.view);
            return self.view;
        };

        self.leave(self.view);

        match action {
            NavAction::SelectStage(stage) => self.enter_with_stage(stage).await,
            _ => {
                self.view = target;
                self.enter(target).await;
            }
        }
        self.view
    }

    /// Screen-local state that must not survive leaving the screen.
    fn leave(&mut self, from: View) {
        match from {
            View::Quiz => self.quiz.exit(),
            View::Learning => self.modules.close(),
            _ => {}
        }
    }

    async fn enter_with_stage(&mut self, stage: LifeStage) {
        info!("Life stage {} selected for session {}.", stage, self.session_id);
        self.stage = Some(stage);
        self.view = View::Chat;

        if let Err(e) = self.gateway.update_stage(&self.session_id, stage).await {
            error!(
                "Failed to record life stage for session {}: {}",
                self.session_id, e
            );
        }
        self.chat.load_history().await;
    }

    async fn enter(&mut self, view: View) {
        let Some(stage) = self.stage else {
            return;
        };
        match view {
            View::Learning => self.modules.load(stage).await,
            View::Quiz => self.quiz.load(stage).await,
            View::Profile => self.profile.refresh().await,
            View::StageSelect | View::Chat => {}
        }
    }
}
