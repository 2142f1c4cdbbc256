use anyhow::{Context, Result};

use super::cache::ReferenceCache;
use super::render::{render_body, truncate_body, MAX_BODY_LEN};
use super::state::map_state;
use crate::model::commit::Commit;
use crate::model::issue::{Issue, IssueState, NewIssue};
use crate::model::user_map::UserMap;
use crate::model::work_item::{fields, WorkItem};
use crate::providers::TargetTracker;

pub const AREA_LABEL_COLOR: &str = "bfd4f2";
pub const TYPE_LABEL_COLOR: &str = "f9d0c4";

/// What happened to one work item.
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub issue: Issue,
    pub closed: bool,
    pub comments: usize,
}

/// Turns a work item and its commits into an issue in the target.
pub struct IssueSynthesizer<'a> {
    target: &'a dyn TargetTracker,
    users: &'a UserMap,
    cache: ReferenceCache,
}

impl<'a> IssueSynthesizer<'a> {
    pub fn new(target: &'a dyn TargetTracker, users: &'a UserMap, cache: ReferenceCache) -> Self {
        Self {
            target,
            users,
            cache,
        }
    }

    /// Build the creation payload, resolving labels, assignee and milestone.
    pub async fn prepare(&mut self, item: &WorkItem, commits: &[Commit]) -> Result<NewIssue> {
        let mut body = render_body(item, commits, self.users);
        if truncate_body(&mut body, MAX_BODY_LEN) {
            tracing::warn!(
                work_item = item.id,
                max = MAX_BODY_LEN,
                "truncated issue body that exceeded the maximum length"
            );
        }

        let mut labels = Vec::new();
        if let Some(area) = item.field(fields::AREA) {
            let label = self
                .cache
                .label(self.target, &format!("Area: {area}"), AREA_LABEL_COLOR)
                .await?;
            labels.push(label.name);
        }
        if let Some(kind) = item.field(fields::WORK_ITEM_TYPE) {
            let label = self
                .cache
                .label(self.target, &format!("Type: {kind}"), TYPE_LABEL_COLOR)
                .await?;
            labels.push(label.name);
        }

        let mut assignees = Vec::new();
        if let Some(source) = item.field(fields::ASSIGNED_TO) {
            let login = self.users.target_login(&source);
            if let Some(user) = self.cache.user(self.target, login).await {
                assignees.push(user.login);
            }
        }

        let milestone = match item.field(fields::ITERATION) {
            Some(iteration) => Some(self.cache.milestone(self.target, &iteration).await?.number),
            None => None,
        };

        Ok(NewIssue {
            title: item.title(),
            body,
            assignees,
            labels,
            milestone,
        })
    }

    /// Create the issue, close it when the work item is done, then point
    /// every linked commit at it.
    pub async fn synthesize(&mut self, item: &WorkItem, commits: &[Commit]) -> Result<Synthesized> {
        let state = map_state(&item.state().unwrap_or_default())
            .with_context(|| format!("Cannot migrate work item {}", item.id))?;

        let new_issue = self.prepare(item, commits).await?;
        let issue = self.target.create_issue(&new_issue).await?;

        let closed = state == IssueState::Closed;
        if closed {
            self.target.close_issue(&issue).await?;
        }

        let comment = format!("Associated work item {} issue {}", item.id, issue.html_url);
        for commit in commits {
            self.target.comment_on_commit(commit, &comment).await?;
        }

        Ok(Synthesized {
            issue,
            closed,
            comments: commits.len(),
        })
    }
}
