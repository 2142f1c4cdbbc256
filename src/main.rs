mod cli;
mod config;
mod error;
mod journal;
mod migrate;
mod model;
mod providers;
mod util;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Settings;
use journal::Journal;
use migrate::driver::MigrationDriver;
use migrate::index::MarkerPattern;
use model::user_map::UserMap;
use util::retry::RetryPolicy;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let config = config::load_config(cli.config.as_deref())?;
    let settings = match Settings::resolve(&cli, config) {
        Ok(settings) => settings,
        Err(e) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, e)
            .exit(),
    };

    let users = match &settings.user_map {
        Some(path) => config::load_user_map(path)?,
        None => UserMap::default(),
    };
    let marker = MarkerPattern::new(settings.marker_prefix.as_deref())?;

    let journal = Journal::new(Journal::default_path(), &settings.gh_repo);
    if let (Some(last), None) = (journal.last(), settings.start) {
        tracing::info!(
            work_item = last.work_item_id,
            issue = %last.issue_url,
            "a previous run already created issues in this repository; pass --start {} to resume after it",
            last.work_item_id
        );
    }

    tracing::info!(url = %settings.tfs_url, project = %settings.tfs_project, "connecting to TFS");
    let source = providers::create_source(&settings, RetryPolicy::default());
    tracing::info!(repo = %settings.gh_repo, "connecting to GitHub");
    let target = providers::create_target(&settings, RetryPolicy::default());

    let summary = MigrationDriver::new(source.as_ref(), target.as_ref(), &users, &marker, &journal)
        .run(settings.start)
        .await?;

    tracing::info!(
        fetched = summary.fetched,
        created = summary.created,
        closed = summary.closed,
        skipped = summary.skipped,
        commit_comments = summary.comments,
        linked_work_items = summary.linked_items,
        unmatched_commits = summary.unmatched_commits,
        "migration finished"
    );

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,work_migrate=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
