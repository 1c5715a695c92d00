use crate::repo_id::RepoId;
use clap::Parser;

/// Shows how fresh the latest releases of the configured repositories are.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Repository holding `config.json`, in `:owner/:name` form.
    #[clap(long, env = "RELBOARD_CONFIG_REPO")]
    pub config_repo: RepoId,

    /// Branch to read the configuration from. Defaults to the repository's default branch.
    #[clap(long)]
    pub branch: Option<String>,

    /// Also list projects that could not be resolved.
    #[clap(long)]
    pub all: bool,

    /// Print JSON instead of the dashboard.
    #[clap(long)]
    pub json: bool,
}

pub fn cmd() -> Cli {
    Cli::parse()
}
