use serde::{Deserialize, Serialize};

/// A commit in the target repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    /// Browser URL of the commit, linked from issue bodies.
    pub html_url: String,
    pub message: String,
}
