use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::MigrateError;
use crate::model::user_map::UserMap;
use crate::model::work_item::WorkItemId;

pub const DEFAULT_PROJECT: &str = "DefaultCollection";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub tfs: Option<TfsConfig>,
    pub github: Option<GitHubConfig>,
    pub user_map: Option<PathBuf>,
    pub marker_prefix: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TfsConfig {
    pub url: Option<String>,
    pub project: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitHubConfig {
    pub repo: Option<String>,
    pub token: Option<String>,
}

fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".work-migrate")
}

/// Load the config file. The default location may be absent; an explicitly
/// named file must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = config_path();
            if !path.exists() {
                return Ok(AppConfig::default());
            }
            path
        }
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    Ok(toml::from_str(contents)?)
}

pub fn load_user_map(path: &Path) -> Result<UserMap> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read user map {}", path.display()))?;
    UserMap::parse(&contents).with_context(|| format!("Invalid user map {}", path.display()))
}

/// Everything a run needs, after merging the command line over the config file.
pub struct Settings {
    pub tfs_url: String,
    pub tfs_project: String,
    pub tfs_token: String,
    pub gh_repo: String,
    pub gh_token: String,
    pub user_map: Option<PathBuf>,
    pub marker_prefix: Option<String>,
    pub start: Option<WorkItemId>,
}

impl Settings {
    /// Command-line values win. Every missing required value is reported at once.
    pub fn resolve(cli: &Cli, config: AppConfig) -> Result<Self, MigrateError> {
        let tfs = config.tfs.unwrap_or_default();
        let github = config.github.unwrap_or_default();

        let tfs_url = cli.tfs_url.clone().or(tfs.url);
        let tfs_token = cli.tfs_token.clone().or(tfs.token);
        let gh_repo = cli.gh_repo.clone().or(github.repo);
        let gh_token = cli.gh_token.clone().or(github.token);

        let missing: Vec<&'static str> = [
            ("--tfs-url", tfs_url.is_none()),
            ("--tfs-token", tfs_token.is_none()),
            ("--gh-repo", gh_repo.is_none()),
            ("--gh-token", gh_token.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (tfs_url, tfs_token, gh_repo, gh_token) {
            (Some(tfs_url), Some(tfs_token), Some(gh_repo), Some(gh_token)) => Ok(Self {
                tfs_url,
                tfs_project: cli
                    .tfs_project
                    .clone()
                    .or(tfs.project)
                    .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
                tfs_token,
                gh_repo,
                gh_token,
                user_map: cli.user_map.clone().or(config.user_map),
                marker_prefix: cli.marker_prefix.clone().or(config.marker_prefix),
                start: cli.start,
            }),
            _ => Err(MigrateError::MissingArguments(missing)),
        }
    }
}
