use std::collections::HashMap;

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::change_set::ChangeSetId;
use crate::model::commit::Commit;

/// Footer git-tfs writes into every commit converted from a TFVC change set,
/// e.g. `git-tfs-id: [http://tfs:8080/tfs/DefaultCollection]$/Project/Main;C1234`.
const GIT_TFS_MARKER: &str = r"git-tfs-id: \[[^\]\r\n]*\]\$/[^\r\n]*;C(\d+)";

/// Recognizes the change-set marker in a commit message.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    regex: Regex,
}

impl MarkerPattern {
    /// With no prefix any git-tfs footer matches; with one, only footers
    /// beginning with that literal text do.
    pub fn new(prefix: Option<&str>) -> Result<Self> {
        let pattern = match prefix {
            Some(prefix) => format!(r"{}[^\r\n]*;C(\d+)", regex::escape(prefix)),
            None => GIT_TFS_MARKER.to_string(),
        };
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Invalid change set marker pattern {pattern:?}"))?;
        Ok(Self { regex })
    }

    pub fn change_set_id(&self, message: &str) -> Option<ChangeSetId> {
        self.regex
            .captures(message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Change-set ID → the commit that carries its marker.
#[derive(Debug, Default)]
pub struct ChangeSetIndex {
    commits: HashMap<ChangeSetId, Commit>,
    unmatched: usize,
}

impl ChangeSetIndex {
    /// Later commits win when two carry the same change-set ID.
    pub fn build(commits: impl IntoIterator<Item = Commit>, pattern: &MarkerPattern) -> Self {
        let mut index = Self::default();
        for commit in commits {
            match pattern.change_set_id(&commit.message) {
                Some(id) => {
                    if let Some(previous) = index.commits.insert(id, commit) {
                        tracing::debug!(
                            change_set = id,
                            replaced = %previous.sha,
                            "change set marker found on more than one commit"
                        );
                    }
                }
                None => index.unmatched += 1,
            }
        }
        index
    }

    pub fn get(&self, id: ChangeSetId) -> Option<&Commit> {
        self.commits.get(&id)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Commits with no recognizable marker.
    pub fn unmatched(&self) -> usize {
        self.unmatched
    }
}
