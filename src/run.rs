use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use serde_json::Value;

use crate::aggregate;
use crate::cli::parser::{Cli, Command};
use crate::config::{self, ConfigKey, RunConfig, Settings};
use crate::due_date::DueDate;
use crate::error::{MilestoneError, Result};
use crate::github::GitHubApi;
use crate::github::client::RestClient;
use crate::output::{self, Output};
use crate::plan::{Intent, MutationPlanner, PlanReport};
use crate::resolver;

/// Exit status when the pass finished but some repositories or edits failed.
const PARTIAL_FAILURE: u8 = 3;

pub async fn run(
    cli: Cli,
    out: &mut (dyn Write + Send),
    err: &mut (dyn Write + Send),
) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let settings = resolve_settings(&cli, &cwd)?;
    let client = RestClient::new(&settings.api_url, settings.token)
        .context("Failed to create HTTP client")?;

    let mut output = Output::new(out, err);
    let report = execute(&client, &cli.command, &mut output).await?;
    output.flush()?;

    if report.failures > 0 {
        return Ok(ExitCode::from(PARTIAL_FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Project config file, overridden by flags and environment.
pub fn resolve_settings(cli: &Cli, dir: &Path) -> anyhow::Result<Settings> {
    let file_config = config::load_project_config(dir)?;

    let mut overrides = HashMap::new();
    if let Some(token) = &cli.token {
        overrides.insert(ConfigKey::Token, Value::String(token.clone()));
    }
    if let Some(api_url) = &cli.api_url {
        overrides.insert(ConfigKey::ApiUrl, Value::String(api_url.clone()));
    }

    Settings::from_config(&config::update_config(&file_config, &overrides))
}

/// Runs one command against `api`. Input is validated before the first remote call.
pub async fn execute<A>(api: &A, command: &Command, output: &mut Output<'_>) -> Result<PlanReport>
where
    A: GitHubApi + ?Sized,
{
    match command {
        Command::List { target } => {
            let repos = resolver::resolve(api, target).await?;
            let aggregation = aggregate::aggregate(api, &repos).await?;
            output::render_aggregation(output, &aggregation)?;
            Ok(PlanReport::default())
        }
        Command::Set {
            target,
            title,
            due,
            yes,
        } => {
            let intent = Intent::SetDueDate(DueDate::parse(due)?);
            mutate(api, target, title, intent, *yes, output).await
        }
        Command::Close { target, title, yes } => {
            mutate(api, target, title, Intent::Close, *yes, output).await
        }
        Command::Open {
            target,
            title,
            due,
            yes,
        } => {
            let intent = Intent::Open(DueDate::parse(due)?);
            mutate(api, target, title, intent, *yes, output).await
        }
    }
}

async fn mutate<A>(
    api: &A,
    target: &str,
    title: &str,
    intent: Intent,
    confirm: bool,
    output: &mut Output<'_>,
) -> Result<PlanReport>
where
    A: GitHubApi + ?Sized,
{
    if title.trim().is_empty() {
        return Err(MilestoneError::Argument(
            "missing milestone title (not its number)".to_string(),
        ));
    }
    intent.ensure_supported()?;

    let repos = resolver::resolve(api, target).await?;
    MutationPlanner::new(api, &RunConfig { confirm })
        .execute(&repos, title, &intent, output)
        .await
}
