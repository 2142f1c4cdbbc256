use crate::model::commit::Commit;
use crate::model::user_map::UserMap;
use crate::model::work_item::{fields, WorkItem};

/// Longest issue body the target accepts, in characters.
pub const MAX_BODY_LEN: usize = 65536;

/// Render the issue body for a work item and its linked commits.
pub fn render_body(item: &WorkItem, commits: &[Commit], users: &UserMap) -> String {
    let history = item
        .field(fields::HISTORY)
        .map(|h| format!("History: \r\n\r\n{h}"))
        .unwrap_or_default();
    let closed_reason = if item.state().as_deref() == Some("Closed") {
        item.text(fields::REASON)
    } else {
        String::new()
    };

    format!(
        "**TFS#: {id}**
---
{description}
<br>
{repro}
<br>
{history}

<br><br>

|Action|By|Date|Reason|
|------|--|-----|-----|
|Created  | {created_by} | {created_date} |    |
|Resolved | {resolved_by} | {resolved_date} | {resolved_reason} |
|Closed   | {closed_by} | {closed_date} | {closed_reason} |
<br>
{commits}
",
        id = item.id,
        description = item.text(fields::DESCRIPTION),
        repro = item.text(fields::REPRO_STEPS),
        created_by = mention(item, fields::CREATED_BY, users),
        created_date = item.text(fields::CREATED_DATE),
        resolved_by = mention(item, fields::RESOLVED_BY, users),
        resolved_date = item.text(fields::RESOLVED_DATE),
        resolved_reason = item.text(fields::RESOLVED_REASON),
        closed_by = mention(item, fields::CLOSED_BY, users),
        closed_date = item.text(fields::CLOSED_DATE),
        commits = commit_list(commits),
    )
}

/// `@login` of the translated actor, or nothing.
fn mention(item: &WorkItem, field: &str, users: &UserMap) -> String {
    match item.field(field) {
        Some(source) => {
            let login = users.target_login(&source);
            if login.is_empty() {
                String::new()
            } else {
                format!("@{login}")
            }
        }
        None => String::new(),
    }
}

fn commit_list(commits: &[Commit]) -> String {
    if commits.is_empty() {
        return String::new();
    }
    let mut out = String::from("Commits: \r\n\r\n");
    for commit in commits {
        out.push_str(&format!("- {} \r\n", commit.html_url));
    }
    out
}

/// Cut `body` down to `max` characters. Returns whether anything was cut.
pub fn truncate_body(body: &mut String, max: usize) -> bool {
    match body.char_indices().nth(max) {
        Some((byte_idx, _)) => {
            body.truncate(byte_idx);
            true
        }
        None => false,
    }
}
