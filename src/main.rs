#![deny(rust_2018_idioms)]

use anyhow::{Context, Result};
use relboard::{
    app_env::{AppConfig, AppEnv},
    cli,
    commands::dashboard::{self, DashboardOptions},
    memo::FailurePolicy,
    pipeline::SessionConfig,
};
use sekret::Secret;
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cmd = cli::cmd();
    debug!(?cmd, "launched");

    let github_token = Secret(env::var("RELBOARD_TOKEN").context("RELBOARD_TOKEN is not set.")?);
    let cfg = AppConfig {
        github_token,
        session: SessionConfig {
            config_repo: cmd.config_repo.clone(),
            config_branch: cmd.branch.clone(),
            failure_policy: FailurePolicy::Cache,
        },
    };
    let app_env = AppEnv::new(cfg)?;

    let outcomes = app_env
        .session()
        .aggregate()
        .await
        .with_context(|| format!("Failed to load projects from {}.", cmd.config_repo))?;

    let opts = DashboardOptions {
        show_failures: cmd.all,
    };
    if cmd.json {
        println!("{}", dashboard::render_json(&outcomes, opts)?);
    } else {
        dashboard::print_dashboard(&outcomes, opts)?;
    }

    debug!("exiting");
    Ok(())
}
