//! crates/finbuddy_core/src/profile.rs
//!
//! Read-only presentation of the gamified profile and the badge catalog.

use std::sync::Arc;
use tracing::error;

use crate::domain::{Badge, Profile, SessionId};
use crate::ports::ContentGateway;

/// Badges split by whether the profile holds them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BadgePartition<'a> {
    pub earned: Vec<&'a Badge>,
    pub available: Vec<&'a Badge>,
}

/// Partitions the catalog by membership of each badge id in `profile.badges`.
/// Without a profile every badge is still available.
pub fn partition_badges<'a>(catalog: &'a [Badge], profile: Option<&Profile>) -> BadgePartition<'a> {
    let (earned, available): (Vec<&Badge>, Vec<&Badge>) = catalog.iter().partition(|badge| {
        profile.is_some_and(|p| p.badges.iter().any(|id| *id == badge.id))
    });
    BadgePartition { earned, available }
}

pub struct ProfileView {
    gateway: Arc<dyn ContentGateway>,
    session_id: SessionId,
    profile: Option<Profile>,
    badges: Vec<Badge>,
    loading: bool,
}

impl ProfileView {
    pub fn new(gateway: Arc<dyn ContentGateway>, session_id: SessionId) -> Self {
        Self {
            gateway,
            session_id,
            profile: None,
            badges: Vec::new(),
            loading: false,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn partition(&self) -> BadgePartition<'_> {
        partition_badges(&self.badges, self.profile.as_ref())
    }

    /// Re-fetches the profile and badge catalog. Failures leave the view
    /// empty rather than stale.
    pub async fn refresh(&mut self) {
        self.loading = true;

        self.profile = match self.gateway.get_profile(&self.session_id).await {
            Ok(profile) => profile,
            Err(e) => {
                error!(
                    "Failed to load profile for session {}: {}",
                    self.session_id, e
                );
                None
            }
        };

        self.badges = match self.gateway.get_badges().await {
            Ok(badges) => badges,
            Err(e) => {
                error!("Failed to load badge catalog: {}", e);
                Vec::new()
            }
        };

        self.loading = false;
    }
}
