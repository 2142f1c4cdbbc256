use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "work-migrate",
    version,
    about = "Migrate TFS work items to GitHub issues, linking the git-tfs commits of each work item"
)]
pub struct Cli {
    /// TFS server URL, e.g. http://tfs.example.com/tfs
    #[arg(short = 'u', long, value_name = "URL")]
    pub tfs_url: Option<String>,

    /// TFS personal access token
    #[arg(short = 't', long, env = "TFS_TOKEN", hide_env_values = true)]
    pub tfs_token: Option<String>,

    /// TFS collection (and optionally project) path [default: DefaultCollection]
    #[arg(short = 'p', long, value_name = "COLLECTION")]
    pub tfs_project: Option<String>,

    /// Target GitHub repository
    #[arg(short = 'r', long, value_name = "OWNER/REPO")]
    pub gh_repo: Option<String>,

    /// GitHub access token
    #[arg(short = 'a', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// File of `tfs-user=github-login` lines
    #[arg(short = 'm', long, value_name = "FILE")]
    pub user_map: Option<PathBuf>,

    /// Only migrate work items with an ID greater than this
    #[arg(short = 's', long, value_name = "ID")]
    pub start: Option<u64>,

    /// Only accept git-tfs footers starting with this literal text
    #[arg(long, value_name = "TEXT")]
    pub marker_prefix: Option<String>,

    /// Config file [default: ~/.work-migrate/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug detail
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("work-migrate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_short_flags() {
        let cli = parse(&[
            "-u", "http://tfs/tfs", "-t", "pat", "-p", "Coll", "-r", "acme/widgets", "-a", "ghp",
            "-m", "users.txt", "-s", "42",
        ]);
        assert_eq!(cli.tfs_url.as_deref(), Some("http://tfs/tfs"));
        assert_eq!(cli.tfs_token.as_deref(), Some("pat"));
        assert_eq!(cli.tfs_project.as_deref(), Some("Coll"));
        assert_eq!(cli.gh_repo.as_deref(), Some("acme/widgets"));
        assert_eq!(cli.gh_token.as_deref(), Some("ghp"));
        assert_eq!(cli.user_map, Some(PathBuf::from("users.txt")));
        assert_eq!(cli.start, Some(42));
        assert!(!cli.verbose);
    }

    #[test]
    fn parses_long_flags() {
        let cli = parse(&[
            "--tfs-url",
            "http://tfs/tfs",
            "--gh-repo",
            "acme/widgets",
            "--start",
            "7",
            "--marker-prefix",
            "git-tfs-id: [http://tfs/tfs/DefaultCollection]$/CSPro/",
            "--verbose",
        ]);
        assert_eq!(cli.start, Some(7));
        assert!(cli.marker_prefix.unwrap().ends_with("$/CSPro/"));
        assert!(cli.verbose);
    }

    #[test]
    fn everything_is_optional_at_parse_time() {
        let cli = parse(&[]);
        assert!(cli.tfs_url.is_none());
        assert!(cli.start.is_none());
    }

    #[test]
    fn non_numeric_start_is_rejected() {
        let result = Cli::try_parse_from(["work-migrate", "--start", "abc"]);
        assert!(result.is_err());
    }
}
