use anyhow::{Context, Result};

use super::cache::ReferenceCache;
use super::correlate::CorrelationMap;
use super::index::{ChangeSetIndex, MarkerPattern};
use super::linkage::WorkItemLinkage;
use super::synth::IssueSynthesizer;
use crate::journal::Journal;
use crate::model::user_map::UserMap;
use crate::model::work_item::WorkItemId;
use crate::providers::{SourceTracker, TargetTracker};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub created: usize,
    pub closed: usize,
    pub skipped: usize,
    pub comments: usize,
    pub unmatched_commits: usize,
    /// Work items with at least one linked commit.
    pub linked_items: usize,
}

pub struct MigrationDriver<'a> {
    source: &'a dyn SourceTracker,
    target: &'a dyn TargetTracker,
    users: &'a UserMap,
    marker: &'a MarkerPattern,
    journal: &'a Journal,
}

impl<'a> MigrationDriver<'a> {
    pub fn new(
        source: &'a dyn SourceTracker,
        target: &'a dyn TargetTracker,
        users: &'a UserMap,
        marker: &'a MarkerPattern,
        journal: &'a Journal,
    ) -> Self {
        Self {
            source,
            target,
            users,
            marker,
            journal,
        }
    }

    /// Build both indices in full, then compose them.
    pub async fn correlate(&self) -> Result<(CorrelationMap, usize)> {
        tracing::info!(target_tracker = self.target.name(), "loading commits");
        let commits = self.target.commits().await?;
        let total = commits.len();
        let index = ChangeSetIndex::build(commits, self.marker);
        tracing::info!(
            commits = total,
            matched = index.len(),
            unmatched = index.unmatched(),
            "{} commits missing TFS change set numbers",
            index.unmatched()
        );

        tracing::info!(source_tracker = self.source.name(), "loading change sets");
        let change_sets = self.source.change_sets().await?;
        let linkage = WorkItemLinkage::build(&change_sets);

        Ok((CorrelationMap::compose(&index, &linkage), index.unmatched()))
    }

    /// Migrate every work item with an ID above `start`, in source order.
    pub async fn run(&self, start: Option<WorkItemId>) -> Result<RunSummary> {
        tracing::info!(source_tracker = self.source.name(), "querying work items");
        let ids = self.source.query_work_item_ids().await?;
        let items = self.source.fetch_work_items(&ids).await?;

        let (correlation, unmatched) = self.correlate().await?;
        let mut summary = RunSummary {
            fetched: items.len(),
            unmatched_commits: unmatched,
            linked_items: correlation.len(),
            ..RunSummary::default()
        };

        let mut synth = IssueSynthesizer::new(self.target, self.users, ReferenceCache::new());
        let mut last_migrated: Option<WorkItemId> = None;
        let total = items.len();

        for (n, item) in items.iter().enumerate() {
            if start.is_some_and(|s| item.id <= s) {
                summary.skipped += 1;
                continue;
            }

            let out = synth
                .synthesize(item, correlation.commits_for(item.id))
                .await
                .with_context(|| match last_migrated {
                    Some(last) => format!(
                        "Migration stopped at work item {}; last migrated work item was {last}",
                        item.id
                    ),
                    None => format!(
                        "Migration stopped at work item {} before any issue was created",
                        item.id
                    ),
                })?;

            self.journal.record(item.id, &out);
            tracing::info!(
                progress = %format!("{}/{total}", n + 1),
                work_item = item.id,
                issue = %out.issue.html_url,
                closed = out.closed,
                "created issue"
            );

            summary.created += 1;
            summary.comments += out.comments;
            if out.closed {
                summary.closed += 1;
            }
            last_migrated = Some(item.id);
        }

        Ok(summary)
    }
}
