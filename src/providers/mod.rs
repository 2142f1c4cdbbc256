pub mod github;
pub mod tfs;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Settings;
use crate::model::change_set::ChangeSet;
use crate::model::commit::Commit;
use crate::model::issue::{Issue, Label, Milestone, NewIssue, User};
use crate::model::work_item::{WorkItem, WorkItemId};
use crate::util::retry::RetryPolicy;

/// The legacy tracker work items and change sets are read from.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    fn name(&self) -> &str;
    /// IDs of every work item, in the order the server returns them.
    async fn query_work_item_ids(&self) -> Result<Vec<WorkItemId>>;
    async fn fetch_work_items(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>>;
    /// Every change set with its linked work items.
    async fn change_sets(&self) -> Result<Vec<ChangeSet>>;
}

/// The tracker issues are created in. Also owns the repository whose
/// commit history carries the change-set markers.
#[async_trait]
pub trait TargetTracker: Send + Sync {
    fn name(&self) -> &str;
    async fn commits(&self) -> Result<Vec<Commit>>;
    /// `Ok(None)` when the login does not exist; `Err` on transport failure.
    async fn find_user(&self, login: &str) -> Result<Option<User>>;
    async fn labels(&self) -> Result<Vec<Label>>;
    async fn create_label(&self, name: &str, color: &str) -> Result<Label>;
    async fn milestones(&self) -> Result<Vec<Milestone>>;
    async fn create_milestone(&self, title: &str) -> Result<Milestone>;
    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue>;
    async fn close_issue(&self, issue: &Issue) -> Result<()>;
    async fn comment_on_commit(&self, commit: &Commit, body: &str) -> Result<()>;
}


pub fn create_source(settings: &Settings, retry: RetryPolicy) -> Box<dyn SourceTracker> {
    Box::new(tfs::TfsProvider::new(
        &settings.tfs_url,
        &settings.tfs_project,
        &settings.tfs_token,
        retry,
    ))
}

pub fn create_target(settings: &Settings, retry: RetryPolicy) -> Box<dyn TargetTracker> {
    Box::new(github::GitHubProvider::new(
        github::API_BASE,
        &settings.gh_repo,
        &settings.gh_token,
        retry,
    ))
}
