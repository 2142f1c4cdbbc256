use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type WorkItemId = u64;

/// TFS field reference names read during migration.
pub mod fields {
    pub const TITLE: &str = "System.Title";
    pub const DESCRIPTION: &str = "System.Description";
    pub const REPRO_STEPS: &str = "Microsoft.VSTS.TCM.ReproSteps";
    pub const HISTORY: &str = "System.History";
    pub const AREA: &str = "System.AreaLevel2";
    pub const ITERATION: &str = "System.IterationLevel2";
    pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
    pub const ASSIGNED_TO: &str = "System.AssignedTo";
    pub const STATE: &str = "System.State";
    pub const REASON: &str = "System.Reason";
    pub const CREATED_BY: &str = "System.CreatedBy";
    pub const CREATED_DATE: &str = "System.CreatedDate";
    pub const RESOLVED_BY: &str = "Microsoft.VSTS.Common.ResolvedBy";
    pub const RESOLVED_DATE: &str = "Microsoft.VSTS.Common.ResolvedDate";
    pub const RESOLVED_REASON: &str = "Microsoft.VSTS.Common.ResolvedReason";
    pub const CLOSED_BY: &str = "Microsoft.VSTS.Common.ClosedBy";
    pub const CLOSED_DATE: &str = "Microsoft.VSTS.Common.ClosedDate";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl WorkItem {
    pub fn new(id: WorkItemId) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Text value of a field. Missing, null and empty values all read as `None`.
    ///
    /// Identity fields come back either as `"Name <DOMAIN\\login>"` strings or,
    /// on newer servers, as objects; the latter resolve to `uniqueName`.
    pub fn field(&self, name: &str) -> Option<String> {
        let text = match self.fields.get(name)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Object(obj) => obj
                .get("uniqueName")
                .or_else(|| obj.get("displayName"))
                .and_then(|v| v.as_str())?
                .to_string(),
            Value::Null | Value::Array(_) => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Field text, or the empty string when absent.
    pub fn text(&self, name: &str) -> String {
        self.field(name).unwrap_or_default()
    }

    pub fn title(&self) -> String {
        self.text(fields::TITLE)
    }

    pub fn state(&self) -> Option<String> {
        self.field(fields::STATE)
    }
}
