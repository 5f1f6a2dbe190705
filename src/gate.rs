//! The single point where a planned change is either reported or applied.

use crate::config::RunConfig;
use crate::error::{MilestoneError, Result};
use crate::github::GitHubApi;
use crate::output::Output;
use crate::plan::PlannedChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Dry run: the change was described, nothing was sent.
    Reported,
    /// The edit call succeeded.
    Applied,
}

#[derive(Debug, Clone, Copy)]
pub struct DryRunGate {
    confirm: bool,
}

impl DryRunGate {
    pub fn new(config: &RunConfig) -> Self {
        DryRunGate {
            confirm: config.confirm,
        }
    }

    pub fn confirmed(&self) -> bool {
        self.confirm
    }

    /// Without confirmation prints `would ...` and makes no call. With
    /// confirmation issues exactly one edit call and prints the completed form.
    pub async fn pass<A>(
        &self,
        api: &A,
        change: &PlannedChange,
        output: &mut Output<'_>,
    ) -> Result<GateOutcome>
    where
        A: GitHubApi + ?Sized,
    {
        if !self.confirm {
            output.println(&change.describe(false))?;
            return Ok(GateOutcome::Reported);
        }

        api.edit_milestone(&change.repo, change.number, &change.patch())
            .await
            .map_err(|source| MilestoneError::Mutation {
                action: change.action(),
                title: change.title.clone(),
                number: change.number,
                repo: change.repo.clone(),
                source,
            })?;
        output.println(&change.describe(true))?;
        Ok(GateOutcome::Applied)
    }
}
