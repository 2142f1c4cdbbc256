use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::config::data_dir;
use crate::migrate::synth::Synthesized;
use crate::model::work_item::WorkItemId;

/// One created issue, as appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub repo: String,
    pub work_item_id: WorkItemId,
    pub issue_number: u64,
    pub issue_url: String,
    pub closed: bool,
    #[serde(default)]
    pub commits: usize,
}

/// Append-only JSONL record of the issues created for one target repo.
pub struct Journal {
    path: PathBuf,
    repo: String,
}

impl Journal {
    pub fn new(path: PathBuf, repo: &str) -> Self {
        Self {
            path,
            repo: repo.to_string(),
        }
    }

    pub fn default_path() -> PathBuf {
        data_dir().join("journal.jsonl")
    }

    pub fn append(&self, entry: &JournalEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Record a created issue. Failures are logged; they never stop a run.
    pub fn record(&self, work_item_id: WorkItemId, out: &Synthesized) {
        let entry = new_entry(&self.repo, work_item_id, out);
        if let Err(e) = self.append(&entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write journal entry");
        }
    }

    /// Entries for this journal's repo, oldest first, at most `limit` of the newest.
    pub fn entries(&self, limit: Option<usize>) -> Vec<JournalEntry> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let mut entries: Vec<JournalEntry> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .filter(|e: &JournalEntry| e.repo == self.repo)
            .collect();

        if let Some(limit) = limit {
            let len = entries.len();
            if len > limit {
                entries = entries.split_off(len - limit);
            }
        }

        entries
    }

    pub fn last(&self) -> Option<JournalEntry> {
        self.entries(Some(1)).pop()
    }
}

pub fn new_entry(repo: &str, work_item_id: WorkItemId, out: &Synthesized) -> JournalEntry {
    JournalEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        repo: repo.to_string(),
        work_item_id,
        issue_number: out.issue.number,
        issue_url: out.issue.html_url.clone(),
        closed: out.closed,
        commits: out.comments,
    }
}
