use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::TargetTracker;
use crate::error::MigrateError;
use crate::model::commit::Commit;
use crate::model::issue::{Issue, IssueState, Label, Milestone, NewIssue, User};
use crate::util::retry::RetryPolicy;

pub const API_BASE: &str = "https://api.github.com";

const PAGE_SIZE: usize = 100;

pub struct GitHubProvider {
    base_url: String,
    repo: String,
    auth_header: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    page_size: usize,
}

impl GitHubProvider {
    pub fn new(base_url: &str, repo: &str, token: &str, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            auth_header: format!("token {token}"),
            client: reqwest::Client::new(),
            retry,
            page_size: PAGE_SIZE,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("work-migrate/", env!("CARGO_PKG_VERSION")))
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("/repos/{}{rest}", self.repo)
    }

    /// Follow `page=N` until a page comes back short.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let per_page = self.page_size.to_string();
        let mut page = 1u32;
        loop {
            let batch: Vec<T> = self
                .retry
                .send_json(
                    self.request(Method::GET, path)
                        .query(query)
                        .query(&[
                            ("per_page", per_page.as_str()),
                            ("page", page.to_string().as_str()),
                        ]),
                )
                .await?;
            let done = batch.len() < self.page_size;
            all.extend(batch);
            if done {
                return Ok(all);
            }
            page += 1;
        }
    }
}

#[derive(Deserialize)]
struct GhCommit {
    sha: String,
    html_url: String,
    commit: GhCommitDetail,
}

#[derive(Deserialize)]
struct GhCommitDetail {
    message: String,
}

#[async_trait]
impl TargetTracker for GitHubProvider {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn commits(&self) -> Result<Vec<Commit>> {
        let commits: Vec<GhCommit> = self
            .get_all(&self.repo_path("/commits"), &[])
            .await
            .with_context(|| format!("Failed to list commits of {}", self.repo))?;
        Ok(commits
            .into_iter()
            .map(|c| Commit {
                sha: c.sha,
                html_url: c.html_url,
                message: c.commit.message,
            })
            .collect())
    }

    async fn find_user(&self, login: &str) -> Result<Option<User>> {
        let path = format!("/users/{}", urlencoding::encode(login));
        match self.retry.send_json(self.request(Method::GET, &path)).await {
            Ok(user) => Ok(Some(user)),
            Err(e)
                if e.downcast_ref::<MigrateError>()
                    .is_some_and(MigrateError::is_not_found) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn labels(&self) -> Result<Vec<Label>> {
        self.get_all(&self.repo_path("/labels"), &[])
            .await
            .context("Failed to list labels")
    }

    async fn create_label(&self, name: &str, color: &str) -> Result<Label> {
        self.retry
            .send_json(
                self.request(Method::POST, &self.repo_path("/labels"))
                    .json(&json!({ "name": name, "color": color })),
            )
            .await
            .with_context(|| format!("Failed to create label {name:?}"))
    }

    async fn milestones(&self) -> Result<Vec<Milestone>> {
        self.get_all(&self.repo_path("/milestones"), &[("state", "all")])
            .await
            .context("Failed to list milestones")
    }

    async fn create_milestone(&self, title: &str) -> Result<Milestone> {
        self.retry
            .send_json(
                self.request(Method::POST, &self.repo_path("/milestones"))
                    .json(&json!({ "title": title })),
            )
            .await
            .with_context(|| format!("Failed to create milestone {title:?}"))
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.retry
            .send_json(self.request(Method::POST, &self.repo_path("/issues")).json(issue))
            .await
            .with_context(|| format!("Failed to create issue {:?}", issue.title))
    }

    async fn close_issue(&self, issue: &Issue) -> Result<()> {
        let path = self.repo_path(&format!("/issues/{}", issue.number));
        self.retry
            .send(
                self.request(Method::PATCH, &path)
                    .json(&json!({ "state": IssueState::Closed })),
            )
            .await
            .with_context(|| format!("Failed to close issue #{}", issue.number))?;
        Ok(())
    }

    async fn comment_on_commit(&self, commit: &Commit, body: &str) -> Result<()> {
        let path = self.repo_path(&format!("/commits/{}/comments", commit.sha));
        self.retry
            .send(self.request(Method::POST, &path).json(&json!({ "body": body })))
            .await
            .with_context(|| format!("Failed to comment on commit {}", commit.sha))?;
        Ok(())
    }
}
