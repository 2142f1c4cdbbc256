use serde::{Deserialize, Serialize};

use super::work_item::WorkItemId;

pub type ChangeSetId = u64;

/// A TFVC change set and the work items it was checked in against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub id: ChangeSetId,
    #[serde(default)]
    pub work_items: Vec<WorkItemId>,
}

impl ChangeSet {
    pub fn new(id: ChangeSetId, work_items: Vec<WorkItemId>) -> Self {
        Self { id, work_items }
    }
}
