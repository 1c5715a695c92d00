use crate::{
    display::{CommitLine, ProjectHeader},
    pipeline::{ProjectOutcome, ProjectView},
};
use anyhow::Error;
use console::{style, Term};
use serde::Serialize;
use std::{cmp, io::Write};
use unicode_segmentation::UnicodeSegmentation;

#[derive(PartialEq, Copy, Clone, Debug, Default)]
pub struct DashboardOptions {
    /// List projects that failed to resolve, with the reason.
    pub show_failures: bool,
}

/// Prints one card per resolved project, in configuration order.
pub fn print_dashboard(outcomes: &[ProjectOutcome], opts: DashboardOptions) -> Result<(), Error> {
    let mut stdout = Term::buffered_stdout();

    // align the release range column over every card
    let name_width = outcomes
        .iter()
        .filter_map(ProjectOutcome::view)
        .map(|x| x.repo().name.graphemes(true).count())
        .fold(0, cmp::max);

    for outcome in outcomes {
        match &outcome.result {
            Ok(view) => {
                let header = ProjectHeader {
                    view,
                    target_interval_days: outcome.project.deploy_target_interval,
                    name_width,
                };
                writeln!(stdout, "{header}")?;
                for commit in view.commits().iter().rev() {
                    writeln!(stdout, "    {}", CommitLine(commit))?;
                }
                writeln!(stdout)?;
            }
            Err(err) if opts.show_failures => {
                let reason = match std::error::Error::source(err) {
                    Some(source) => format!("{err}: {source}"),
                    None => err.to_string(),
                };
                writeln!(stdout, "{}  {}", outcome.project.repo, style(reason).red())?;
                writeln!(stdout)?;
            }
            Err(_) => {}
        }
    }

    stdout.flush()?;
    Ok(())
}

#[derive(Serialize, Debug)]
struct JsonOutcome<'a> {
    repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    deploy_target_interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    staleness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<&'a ProjectView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Renders outcomes as a JSON array.
pub fn render_json(outcomes: &[ProjectOutcome], opts: DashboardOptions) -> Result<String, Error> {
    let items: Vec<_> = outcomes
        .iter()
        .filter(|x| opts.show_failures || x.result.is_ok())
        .map(|outcome| {
            let view = outcome.view();
            JsonOutcome {
                repo: outcome.project.repo.to_string(),
                deploy_target_interval: outcome.project.deploy_target_interval,
                staleness: view.map(|x| x.staleness(outcome.project.deploy_target_interval)),
                release: view,
                error: outcome.result.as_ref().err().map(ToString::to_string),
            }
        })
        .collect();
    let json = serde_json::to_string_pretty(&items)?;
    Ok(json)
}
