use crate::error::MigrateError;
use crate::model::issue::IssueState;

/// Map a TFS work item state onto the target issue state.
pub fn map_state(state: &str) -> Result<IssueState, MigrateError> {
    match state {
        "Closed" | "Resolved" => Ok(IssueState::Closed),
        "Active" => Ok(IssueState::Open),
        other => Err(MigrateError::UnrecognizedState(other.to_string())),
    }
}
