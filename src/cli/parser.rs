use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ghmm",
    version,
    about = "A tool for managing GitHub milestones across the repositories of an organization"
)]
pub struct Cli {
    /// GitHub access token (for private repos)
    #[arg(short, long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, global = true, env = "GHMM_API_URL")]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Enum representing CLI commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List milestones in an org or repo
    List {
        /// Organization name or owner/repo
        target: String,
    },
    /// Set a milestone's due date in every repository carrying it
    Set {
        /// Organization name or owner/repo
        target: String,
        /// Milestone title (not its number)
        title: String,
        /// Due date, M/D/YYYY
        due: String,
        /// Actually perform the edit instead of just dry-running it
        #[arg(short, long)]
        yes: bool,
    },
    /// Close a milestone by title in every repository carrying it
    Close {
        /// Organization name or owner/repo
        target: String,
        /// Milestone title (not its number)
        title: String,
        /// Actually perform the close instead of just dry-running it
        #[arg(short, long)]
        yes: bool,
    },
    /// Open a milestone with a given title and due date
    Open {
        /// Organization name or owner/repo
        target: String,
        /// Milestone title
        title: String,
        /// Due date, M/D/YYYY
        due: String,
        /// Actually perform the open instead of just dry-running it
        #[arg(short, long)]
        yes: bool,
    },
}

/// Parse command line arguments (including program name)
pub fn parse_args(args: &[String]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}
