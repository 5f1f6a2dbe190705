//! Mutation planning for `set` and `close`.
//!
//! Unlike aggregation, planning is best-effort per repository: a repository
//! whose milestones cannot be listed is reported and skipped, and a failed edit
//! only skips that one milestone.

use tracing::debug;

use crate::config::RunConfig;
use crate::due_date::{self, DueDate};
use crate::error::{MilestoneError, Result};
use crate::gate::DryRunGate;
use crate::github::GitHubApi;
use crate::github::milestones::{MilestonePatch, MilestoneRecord, MilestoneState};
use crate::github::repository::RepositoryRef;
use crate::output::Output;
use crate::warning::Warning;

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SetDueDate(DueDate),
    Close,
    /// Accepted on the command line but not supported.
    Open(DueDate),
}

impl Intent {
    /// Rejects unsupported intents. Called before any remote call is made.
    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            Intent::Open(_) => Err(MilestoneError::NotImplemented("opening milestones")),
            Intent::SetDueDate(_) | Intent::Close => Ok(()),
        }
    }

    fn summary(&self, count: usize, confirmed: bool) -> String {
        match (self, confirmed) {
            (Intent::Close, true) => format!("closed {count} milestones"),
            (Intent::Close, false) => {
                format!("would close {count} milestones; re-run with --yes to close them")
            }
            (_, true) => format!("set {count} milestone due dates"),
            (_, false) => {
                format!("would set {count} milestone due dates; re-run with --yes to edit them")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    DueDate {
        from: Option<DueDate>,
        to: DueDate,
    },
    Close,
}

/// One milestone in one repository that needs one edit call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub repo: RepositoryRef,
    pub number: u64,
    pub title: String,
    pub change: Change,
}

impl PlannedChange {
    pub fn patch(&self) -> MilestonePatch {
        match self.change {
            Change::DueDate { to, .. } => MilestonePatch::due(to),
            Change::Close => MilestonePatch::close(),
        }
    }

    pub(crate) fn action(&self) -> &'static str {
        match self.change {
            Change::DueDate { .. } => "editing",
            Change::Close => "closing",
        }
    }

    /// The output line for this change, in the `would ...` form unless `done`.
    pub fn describe(&self, done: bool) -> String {
        let Self {
            repo,
            number,
            title,
            ..
        } = self;
        match (&self.change, done) {
            (Change::DueDate { from, to }, done) => format!(
                "{} milestone {title} (#{number}) in repo {repo} due date from {} to {to}",
                if done { "changed" } else { "would change" },
                due_date::describe(from.as_ref()),
            ),
            (Change::Close, true) => format!("closed milestone {title} (#{number}) in repo {repo}"),
            (Change::Close, false) => {
                format!("would close milestone {title} (#{number}) in repo {repo}")
            }
        }
    }
}

/// Outcome counts of one planning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// Changes reported (dry run) or applied (confirmed).
    pub candidates: usize,
    /// Repositories that could not be read plus edits that failed.
    pub failures: usize,
}

/// The change `intent` needs for `record`, if any. Only open milestones with
/// the requested title are considered.
pub fn change_for(record: &MilestoneRecord, title: &str, intent: &Intent) -> Option<Change> {
    if record.title != title || record.state != MilestoneState::Open {
        return None;
    }
    match intent {
        Intent::SetDueDate(to) if record.due == Some(*to) => None,
        Intent::SetDueDate(to) => Some(Change::DueDate {
            from: record.due,
            to: *to,
        }),
        Intent::Close => Some(Change::Close),
        Intent::Open(_) => None,
    }
}

pub struct MutationPlanner<'a, A: ?Sized> {
    api: &'a A,
    gate: DryRunGate,
}

impl<'a, A> MutationPlanner<'a, A>
where
    A: GitHubApi + ?Sized,
{
    pub fn new(api: &'a A, config: &RunConfig) -> Self {
        MutationPlanner {
            api,
            gate: DryRunGate::new(config),
        }
    }

    /// Brings every repository's `title` milestone to the state `intent` asks for,
    /// then prints a summary when anything was a candidate.
    pub async fn execute(
        &self,
        repos: &[RepositoryRef],
        title: &str,
        intent: &Intent,
        output: &mut Output<'_>,
    ) -> Result<PlanReport> {
        intent.ensure_supported()?;

        let mut report = PlanReport::default();
        for repo in repos {
            if let Err(err) = self.plan_repository(repo, title, intent, output, &mut report).await {
                if err.is_fatal() {
                    return Err(err);
                }
                debug!(repo = %repo, error = %err, "skipping repository");
                output.error(&err)?;
                report.failures += 1;
            }
        }

        if report.candidates > 0 {
            output.println(&intent.summary(report.candidates, self.gate.confirmed()))?;
        }
        Ok(report)
    }

    async fn plan_repository(
        &self,
        repo: &RepositoryRef,
        title: &str,
        intent: &Intent,
        output: &mut Output<'_>,
        report: &mut PlanReport,
    ) -> Result<()> {
        let records = self
            .api
            .list_milestones(repo)
            .await
            .map_err(|source| MilestoneError::fetch("listing milestones", repo, source))?;

        for record in &records {
            let Some(change) = change_for(record, title, intent) else {
                continue;
            };
            if change == Change::Close {
                self.warn_open_issues(repo, record, output).await?;
            }

            let planned = PlannedChange {
                repo: repo.clone(),
                number: record.number,
                title: record.title.clone(),
                change,
            };
            match self.gate.pass(self.api, &planned, output).await {
                Ok(outcome) => {
                    debug!(repo = %repo, number = record.number, ?outcome, "candidate processed");
                    report.candidates += 1;
                }
                Err(err) if !err.is_fatal() => {
                    debug!(repo = %repo, number = record.number, error = %err, "edit failed");
                    output.error(&err)?;
                    report.failures += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Open issues do not block a close; they are reported so nothing is lost silently.
    async fn warn_open_issues(
        &self,
        repo: &RepositoryRef,
        record: &MilestoneRecord,
        output: &mut Output<'_>,
    ) -> Result<()> {
        let issues = self
            .api
            .list_open_issues(repo, record.number)
            .await
            .map_err(|source| {
                MilestoneError::fetch(
                    format!("checking for open milestone {} issues", record.title),
                    repo,
                    source,
                )
            })?;
        for issue in issues {
            output.warn(&Warning::OpenIssue {
                title: record.title.clone(),
                repo: repo.clone(),
                issue: issue.number,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::{FakeGitHub, milestone, repo};
    use crate::github::milestones::MilestoneState::{Closed, Open};

    struct Captured {
        report: Result<PlanReport>,
        out: String,
        err: String,
    }

    async fn run_plan(api: &FakeGitHub, repos: &[&str], intent: Intent, confirm: bool) -> Captured {
        let repos: Vec<RepositoryRef> = repos.iter().map(|r| repo(r)).collect();
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = MutationPlanner::new(api, &RunConfig { confirm })
            .execute(&repos, "M42", &intent, &mut Output::new(&mut out, &mut err))
            .await;
        Captured {
            report,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn august() -> Intent {
        Intent::SetDueDate(DueDate::parse("8/1/2019").unwrap())
    }

    fn m42_in_a_and_b() -> FakeGitHub {
        FakeGitHub::new()
            .with_milestones("o/a", vec![milestone(1, "M42", Open, Some("7/1/2019"))])
            .with_milestones(
                "o/b",
                vec![
                    milestone(2, "M41", Open, Some("7/1/2019")),
                    milestone(3, "M42", Open, Some("7/1/2019")),
                ],
            )
    }

    #[tokio::test]
    async fn set_due_date_dry_run_reports_without_editing() {
        let api = m42_in_a_and_b();

        let captured = run_plan(&api, &["o/a", "o/b"], august(), false).await;

        assert_eq!(captured.report.unwrap(), PlanReport { candidates: 2, failures: 0 });
        assert_eq!(api.edit_count(), 0);
        let lines: Vec<&str> = captured.out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("would change milestone M42 (#1) in repo o/a"));
        assert!(lines[1].starts_with("would change milestone M42 (#3) in repo o/b"));
        assert_eq!(
            lines[2],
            "would set 2 milestone due dates; re-run with --yes to edit them"
        );
        assert!(captured.err.is_empty());
    }

    #[tokio::test]
    async fn set_due_date_confirmed_edits_each_repository() {
        let api = m42_in_a_and_b();

        let captured = run_plan(&api, &["o/a", "o/b"], august(), true).await;

        assert_eq!(captured.report.unwrap().candidates, 2);
        assert_eq!(api.edit_count(), 2);
        let lines: Vec<&str> = captured.out.lines().collect();
        assert!(lines[0].starts_with("changed milestone M42 (#1) in repo o/a"));
        assert!(lines[1].starts_with("changed milestone M42 (#3) in repo o/b"));
        assert_eq!(lines[2], "set 2 milestone due dates");
    }

    #[tokio::test]
    async fn unchanged_due_date_is_not_a_candidate() {
        let api = m42_in_a_and_b();
        let july = Intent::SetDueDate(DueDate::parse("7/1/2019").unwrap());

        let captured = run_plan(&api, &["o/a", "o/b"], july, true).await;

        assert_eq!(captured.report.unwrap().candidates, 0);
        assert_eq!(api.edit_count(), 0);
        assert!(captured.out.is_empty());
    }

    #[tokio::test]
    async fn close_warns_on_open_issues_and_skips_closed_milestones() {
        let api = FakeGitHub::new()
            .with_milestones("o/a", vec![milestone(1, "M42", Open, Some("7/1/2019"))])
            .with_milestones("o/b", vec![milestone(5, "M42", Closed, Some("7/1/2019"))])
            .with_open_issues("o/a", 1, &[17]);

        let captured = run_plan(&api, &["o/a", "o/b"], Intent::Close, true).await;

        assert_eq!(captured.report.unwrap().candidates, 1);
        assert_eq!(
            *api.edits.lock().unwrap(),
            vec![(repo("o/a"), 1, MilestonePatch::close())]
        );
        assert_eq!(
            captured.err,
            "warning: issue #17 in repo o/a still active in milestone M42\n"
        );
        assert_eq!(
            captured.out,
            "closed milestone M42 (#1) in repo o/a\nclosed 1 milestones\n"
        );
    }

    #[tokio::test]
    async fn close_dry_run_summary_asks_for_confirmation() {
        let api = FakeGitHub::new()
            .with_milestones("o/a", vec![milestone(1, "M42", Open, None)]);

        let captured = run_plan(&api, &["o/a"], Intent::Close, false).await;

        assert_eq!(
            captured.out,
            "would close milestone M42 (#1) in repo o/a\nwould close 1 milestones; re-run with --yes to close them\n"
        );
        assert_eq!(api.edit_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_repository_is_reported_and_skipped() {
        let api = m42_in_a_and_b().failing_repo("o/a");

        let captured = run_plan(&api, &["o/a", "o/b"], august(), true).await;

        assert_eq!(captured.report.unwrap(), PlanReport { candidates: 1, failures: 1 });
        assert_eq!(api.edit_count(), 1);
        assert_eq!(
            captured.err,
            "error: listing milestones in repo o/a: GitHub API returned HTTP 404: Not Found\n"
        );
    }

    #[tokio::test]
    async fn failed_edit_skips_only_that_milestone() {
        let api = m42_in_a_and_b().failing_edit("o/a", 1);

        let captured = run_plan(&api, &["o/a", "o/b"], august(), true).await;

        assert_eq!(captured.report.unwrap(), PlanReport { candidates: 1, failures: 1 });
        assert!(captured.err.starts_with("error: editing milestone M42 (#1) in repo o/a"));
        assert!(captured.out.ends_with("set 1 milestone due dates\n"));
    }

    #[tokio::test]
    async fn failed_issue_listing_skips_the_repository() {
        let api = FakeGitHub::new()
            .with_milestones("o/a", vec![milestone(1, "M42", Open, None)])
            .with_milestones("o/b", vec![milestone(2, "M42", Open, None)])
            .failing_issue_list("o/a", 1);

        let captured = run_plan(&api, &["o/a", "o/b"], Intent::Close, true).await;

        assert_eq!(captured.report.unwrap(), PlanReport { candidates: 1, failures: 1 });
        assert_eq!(*api.edits.lock().unwrap(), vec![(repo("o/b"), 2, MilestonePatch::close())]);
        assert!(captured.err.starts_with("error: checking for open milestone M42 issues in repo o/a"));
    }

    #[tokio::test]
    async fn open_intent_fails_before_any_request() {
        let api = FakeGitHub::new().failing_repo("o/a");
        let open = Intent::Open(DueDate::parse("8/1/2019").unwrap());

        let captured = run_plan(&api, &["o/a"], open, true).await;

        assert!(matches!(captured.report, Err(MilestoneError::NotImplemented(_))));
        assert!(captured.out.is_empty());
        assert!(captured.err.is_empty());
    }

    #[test]
    fn change_for_ignores_other_titles_and_closed_milestones() {
        let close = Intent::Close;
        assert_eq!(change_for(&milestone(1, "M41", Open, None), "M42", &close), None);
        assert_eq!(change_for(&milestone(1, "M42", Closed, None), "M42", &close), None);
        assert_eq!(
            change_for(&milestone(1, "M42", Open, None), "M42", &close),
            Some(Change::Close)
        );
    }

    #[test]
    fn change_for_sets_missing_due_date() {
        let change = change_for(&milestone(1, "M42", Open, None), "M42", &august());
        assert_eq!(
            change,
            Some(Change::DueDate {
                from: None,
                to: DueDate::parse("8/1/2019").unwrap()
            })
        );
    }
}
