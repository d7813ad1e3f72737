//! crates/finbuddy_core/src/modules.rs
//!
//! The module browser: the module list for the current life stage, the set of
//! completed module ids taken from the profile, and the currently open module.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{LifeStage, Module, ModuleCompletion, SessionId};
use crate::notify::{Notification, Notifier};
use crate::ports::{ContentGateway, PortResult};

/// Completion is derived from the profile's completed ids, never stored on
/// the module.
pub fn is_completed(completed: &HashSet<String>, module: &Module) -> bool {
    completed.contains(&module.id)
}

pub struct ModuleBrowser {
    gateway: Arc<dyn ContentGateway>,
    session_id: SessionId,
    notifier: Notifier,
    modules: Vec<Module>,
    loaded_stage: Option<LifeStage>,
    completed: HashSet<String>,
    open: Option<String>,
    loading: bool,
}

impl ModuleBrowser {
    pub fn new(gateway: Arc<dyn ContentGateway>, session_id: SessionId, notifier: Notifier) -> Self {
        Self {
            gateway,
            session_id,
            notifier,
            modules: Vec::new(),
            loaded_stage: None,
            completed: HashSet::new(),
            open: None,
            loading: false,
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn completed_ids(&self) -> &HashSet<String> {
        &self.completed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_completed(&self, module: &Module) -> bool {
        is_completed(&self.completed, module)
    }

    pub fn completed_count(&self) -> usize {
        self.modules.iter().filter(|m| self.is_completed(m)).count()
    }

    /// Fetches the module list (only when the stage changed since the last
    /// successful load) and refreshes the completed set from the profile.
    /// Failures fall back to empty collections.
    pub async fn load(&mut self, stage: LifeStage) {
        self.loading = true;

        if self.loaded_stage != Some(stage) {
            self.open = None;
            match self.gateway.get_modules(stage).await {
                Ok(mut modules) => {
                    modules.sort_by_key(|m| m.order_index);
                    info!("Loaded {} modules for stage {}.", modules.len(), stage);
                    self.modules = modules;
                    self.loaded_stage = Some(stage);
                }
                Err(e) => {
                    error!("Failed to load modules for stage {}: {}", stage, e);
                    self.modules.clear();
                    self.loaded_stage = None;
                }
            }
        }

        self.completed = match self.gateway.get_profile(&self.session_id).await {
            Ok(Some(profile)) => profile.modules_completed.into_iter().collect(),
            Ok(None) => HashSet::new(),
            Err(e) => {
                error!(
                    "Failed to load profile for session {}: {}",
                    self.session_id, e
                );
                HashSet::new()
            }
        };

        self.loading = false;
    }

    /// Opens a module from the current list. Returns false for unknown ids.
    pub fn open(&mut self, module_id: &str) -> bool {
        if self.modules.iter().any(|m| m.id == module_id) {
            self.open = Some(module_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn open_module(&self) -> Option<&Module> {
        let id = self.open.as_deref()?;
        self.modules.iter().find(|m| m.id == id)
    }

    /// Asks the server to mark a module complete. On success the id joins the
    /// local completed set and a one-shot notification is emitted; on failure
    /// nothing changes and the user may retry.
    pub async fn complete(&mut self, module_id: &str) -> PortResult<ModuleCompletion> {
        match self.gateway.complete_module(module_id, &self.session_id).await {
            Ok(completion) => {
                info!(
                    "Module {} completed for session {} (+{} XP).",
                    module_id, self.session_id, completion.xp_earned
                );
                self.completed.insert(module_id.to_string());
                self.notifier.emit(Notification::ModuleCompleted {
                    module_id: module_id.to_string(),
                    xp_earned: completion.xp_earned,
                    new_badges: completion.new_badges.clone(),
                    new_level: completion.new_level,
                });
                Ok(completion)
            }
            Err(e) => {
                error!("Failed to complete module {}: {}", module_id, e);
                Err(e)
            }
        }
    }
}
