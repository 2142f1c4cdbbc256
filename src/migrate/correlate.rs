use std::collections::HashMap;

use super::index::ChangeSetIndex;
use super::linkage::WorkItemLinkage;
use crate::model::commit::Commit;
use crate::model::work_item::WorkItemId;

/// Work-item ID → commits, composed from both indices once they are complete.
#[derive(Debug, Default)]
pub struct CorrelationMap {
    commits: HashMap<WorkItemId, Vec<Commit>>,
}

impl CorrelationMap {
    /// Change sets without a matching commit are dropped silently.
    pub fn compose(index: &ChangeSetIndex, linkage: &WorkItemLinkage) -> Self {
        let commits = linkage
            .iter()
            .filter_map(|(work_item, change_sets)| {
                let commits: Vec<Commit> = change_sets
                    .iter()
                    .filter_map(|cs| index.get(*cs).cloned())
                    .collect();
                (!commits.is_empty()).then_some((work_item, commits))
            })
            .collect();
        Self { commits }
    }

    pub fn commits_for(&self, work_item: WorkItemId) -> &[Commit] {
        self.commits
            .get(&work_item)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of work items with at least one linked commit.
    pub fn len(&self) -> usize {
        self.commits.len()
    }
}
