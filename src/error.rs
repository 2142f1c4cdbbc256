use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("missing required argument(s): {}", .0.join(", "))]
    MissingArguments(Vec<&'static str>),

    #[error("invalid user map entry on line {line}: {content:?} (expected source=target)")]
    InvalidUserMap { line: usize, content: String },

    #[error("unrecognized work item state {0:?}")]
    UnrecognizedState(String),

    #[error("{method} {url} failed with status {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} still failing after {attempts} attempts: {last}")]
    RetriesExhausted {
        method: String,
        url: String,
        attempts: u32,
        last: String,
    },
}

impl MigrateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MigrateError::Http { status: 404, .. })
    }
}
