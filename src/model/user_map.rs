use std::collections::HashMap;

use crate::error::MigrateError;

/// Source login → target login. Logins missing from the table pass through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMap {
    entries: HashMap<String, String>,
}

impl UserMap {
    /// Parse `source=target` lines. Blank lines are skipped; anything after a
    /// second `=` on a line is ignored.
    pub fn parse(contents: &str) -> Result<Self, MigrateError> {
        let mut entries = HashMap::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split('=');
            let (Some(source), Some(target)) = (parts.next(), parts.next()) else {
                return Err(MigrateError::InvalidUserMap {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            entries.insert(source.to_string(), target.to_string());
        }
        Ok(Self { entries })
    }

    pub fn target_login<'a>(&'a self, source: &'a str) -> &'a str {
        self.entries.get(source).map(String::as_str).unwrap_or(source)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for UserMap {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }
}
