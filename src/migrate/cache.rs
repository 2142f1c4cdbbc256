use std::collections::HashMap;

use anyhow::Result;

use crate::model::issue::{Label, Milestone, User};
use crate::providers::TargetTracker;

/// Per-run memo of users, labels and milestones in the target, keyed by
/// natural key. Each key reaches the target at most once.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    /// `None` is a tombstone: the login is unknown or its lookup failed.
    users: HashMap<String, Option<User>>,
    labels: HashMap<String, Label>,
    milestones: HashMap<String, Milestone>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup failures are remembered as "no such user" and never retried.
    pub async fn user(&mut self, target: &dyn TargetTracker, login: &str) -> Option<User> {
        if let Some(cached) = self.users.get(login) {
            return cached.clone();
        }
        let user = match target.find_user(login).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::info!(login, "user not found in target, leaving unassigned");
                None
            }
            Err(e) => {
                tracing::warn!(login, error = %format!("{e:#}"), "user lookup failed, leaving unassigned");
                None
            }
        };
        self.users.insert(login.to_string(), user.clone());
        user
    }

    pub async fn label(
        &mut self,
        target: &dyn TargetTracker,
        name: &str,
        color: &str,
    ) -> Result<Label> {
        if let Some(label) = self.labels.get(name) {
            return Ok(label.clone());
        }
        let label = match target.labels().await?.into_iter().find(|l| l.name == name) {
            Some(existing) => existing,
            None => {
                tracing::info!(name, "creating label");
                target.create_label(name, color).await?
            }
        };
        self.labels.insert(name.to_string(), label.clone());
        Ok(label)
    }

    pub async fn milestone(&mut self, target: &dyn TargetTracker, title: &str) -> Result<Milestone> {
        if let Some(milestone) = self.milestones.get(title) {
            return Ok(milestone.clone());
        }
        let milestone = match target
            .milestones()
            .await?
            .into_iter()
            .find(|m| m.title == title)
        {
            Some(existing) => existing,
            None => {
                tracing::info!(title, "creating milestone");
                target.create_milestone(title).await?
            }
        };
        self.milestones.insert(title.to_string(), milestone.clone());
        Ok(milestone)
    }
}
