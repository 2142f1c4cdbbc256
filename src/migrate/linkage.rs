use std::collections::HashMap;

use crate::model::change_set::{ChangeSet, ChangeSetId};
use crate::model::work_item::WorkItemId;

/// Work-item ID → the change sets checked in against it, in discovery order.
#[derive(Debug, Default)]
pub struct WorkItemLinkage {
    links: HashMap<WorkItemId, Vec<ChangeSetId>>,
}

impl WorkItemLinkage {
    /// Duplicate links are kept as the source reports them.
    pub fn build<'a>(change_sets: impl IntoIterator<Item = &'a ChangeSet>) -> Self {
        let mut links: HashMap<WorkItemId, Vec<ChangeSetId>> = HashMap::new();
        for change_set in change_sets {
            for work_item in &change_set.work_items {
                links.entry(*work_item).or_default().push(change_set.id);
            }
        }
        Self { links }
    }

    pub fn change_sets(&self, work_item: WorkItemId) -> &[ChangeSetId] {
        self.links.get(&work_item).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkItemId, &[ChangeSetId])> {
        self.links.iter().map(|(id, cs)| (*id, cs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_change_sets_per_work_item_in_order() {
        let change_sets = vec![
            ChangeSet::new(100, vec![42, 43]),
            ChangeSet::new(101, vec![42]),
            ChangeSet::new(102, vec![]),
            ChangeSet::new(103, vec![43, 42]),
        ];

        let linkage = WorkItemLinkage::build(&change_sets);

        assert_eq!(linkage.iter().count(), 2);
        assert_eq!(linkage.change_sets(42), &[100, 101, 103]);
        assert_eq!(linkage.change_sets(43), &[100, 103]);
        assert!(linkage.change_sets(44).is_empty());
    }

    #[test]
    fn duplicate_links_are_preserved() {
        let change_sets = vec![ChangeSet::new(7, vec![1, 1])];
        let linkage = WorkItemLinkage::build(&change_sets);
        assert_eq!(linkage.change_sets(1), &[7, 7]);
    }

    #[test]
    fn handles_large_histories() {
        let change_sets: Vec<ChangeSet> = (0..1_000_000u64)
            .map(|id| ChangeSet::new(id, vec![id % 10]))
            .collect();

        let linkage = WorkItemLinkage::build(&change_sets);

        let total: usize = linkage.iter().map(|(_, cs)| cs.len()).sum();
        assert_eq!(total, 1_000_000);
        assert_eq!(linkage.change_sets(3).len(), 100_000);
        assert_eq!(linkage.change_sets(3)[..2], [3, 13]);
    }
}
