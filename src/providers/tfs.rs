use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use super::SourceTracker;
use crate::model::change_set::{ChangeSet, ChangeSetId};
use crate::model::work_item::{fields, WorkItem, WorkItemId};
use crate::util::retry::RetryPolicy;

const API_VERSION: &str = "1.0";
const WORK_ITEM_BATCH: usize = 200;
const CHANGE_SET_PAGE: usize = 256;
const ALL_WORK_ITEMS: &str = "SELECT [System.Id] FROM WorkItems";

pub struct TfsProvider {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    page_size: usize,
}

impl TfsProvider {
    /// `project` is the collection (optionally `collection/project`) path
    /// appended to the server URL.
    pub fn new(server_url: &str, project: &str, token: &str, retry: RetryPolicy) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
        Self {
            base_url: format!(
                "{}/{}",
                server_url.trim_end_matches('/'),
                project.trim_matches('/')
            ),
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
            retry,
            page_size: CHANGE_SET_PAGE,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/_apis{path}", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .query(&[("api-version", API_VERSION)])
    }

    async fn change_set_work_items(&self, id: ChangeSetId) -> Result<Vec<WorkItemId>> {
        let refs: ListResponse<WorkItemRef> = self
            .retry
            .send_json(self.request(Method::GET, &format!("/tfvc/changesets/{id}/workItems")))
            .await
            .with_context(|| format!("Failed to load work items of change set {id}"))?;
        Ok(refs.value.into_iter().map(|r| r.id).collect())
    }
}

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResponse {
    #[serde(default)]
    work_items: Vec<WorkItemRef>,
}

#[derive(Deserialize)]
struct WorkItemRef {
    id: WorkItemId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeSetRef {
    changeset_id: ChangeSetId,
}

#[async_trait]
impl SourceTracker for TfsProvider {
    fn name(&self) -> &str {
        "TFS"
    }

    async fn query_work_item_ids(&self) -> Result<Vec<WorkItemId>> {
        let resp: WiqlResponse = self
            .retry
            .send_json(
                self.request(Method::POST, "/wit/wiql")
                    .json(&json!({ "query": ALL_WORK_ITEMS })),
            )
            .await
            .context("TFS work item query failed")?;
        Ok(resp.work_items.into_iter().map(|w| w.id).collect())
    }

    async fn fetch_work_items(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for batch in ids.chunks(WORK_ITEM_BATCH) {
            let list = batch
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let resp: ListResponse<WorkItem> = self
                .retry
                .send_json(self.request(Method::GET, "/wit/workitems").query(&[("ids", &list)]))
                .await
                .context("Failed to fetch TFS work items")?;
            items.extend(resp.value.into_iter().map(backfill_levels));
        }
        Ok(items)
    }

    async fn change_sets(&self) -> Result<Vec<ChangeSet>> {
        let top = self.page_size.to_string();
        let mut refs: Vec<ChangeSetId> = Vec::new();
        // Pages may come back shorter than requested when the server caps
        // `$top`, so only an empty page ends the listing.
        loop {
            let skip = refs.len().to_string();
            let page: ListResponse<ChangeSetRef> = self
                .retry
                .send_json(
                    self.request(Method::GET, "/tfvc/changesets")
                        .query(&[("$top", top.as_str()), ("$skip", skip.as_str())]),
                )
                .await
                .context("Failed to list TFS change sets")?;
            if page.value.is_empty() {
                break;
            }
            refs.extend(page.value.into_iter().map(|c| c.changeset_id));
        }
        tracing::info!(count = refs.len(), "loaded change sets");

        let mut change_sets = Vec::with_capacity(refs.len());
        for (n, id) in refs.into_iter().enumerate() {
            change_sets.push(ChangeSet::new(id, self.change_set_work_items(id).await?));
            if (n + 1) % 1000 == 0 {
                tracing::info!(done = n + 1, "matching work items to change sets");
            }
        }
        Ok(change_sets)
    }
}

/// Some servers only return the full area/iteration path; derive the
/// second-level classification from it when the level field is missing.
fn backfill_levels(mut item: WorkItem) -> WorkItem {
    for (level, path) in [
        (fields::AREA, "System.AreaPath"),
        (fields::ITERATION, "System.IterationPath"),
    ] {
        if item.field(level).is_some() {
            continue;
        }
        if let Some(second) = item
            .field(path)
            .and_then(|p| p.split('\\').nth(1).map(str::to_string))
        {
            item.fields.insert(level.to_string(), second.into());
        }
    }
    item
}
