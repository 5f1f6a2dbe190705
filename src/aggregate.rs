//! Cross-repository milestone view.
//!
//! Aggregation is two passes. [`MilestoneAggregator::fold`] takes one
//! repository's milestones at a time and flags values that diverge from the
//! first ones seen for a title. [`MilestoneAggregator::finish`] then checks every
//! title against the full repository set, which is only possible once all
//! repositories have been folded.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::due_date::DueDate;
use crate::error::{MilestoneError, Result};
use crate::github::GitHubApi;
use crate::github::milestones::{MilestoneRecord, MilestoneState};
use crate::github::repository::RepositoryRef;
use crate::warning::Warning;

/// One title across all repositories that carry it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedMilestone {
    /// State of the first occurrence. Used as the baseline for warnings only.
    pub state: MilestoneState,
    /// Due date of the first occurrence.
    pub due: Option<DueDate>,
    pub repos: BTreeSet<RepositoryRef>,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    pub milestones: BTreeMap<String, AggregatedMilestone>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Default)]
pub struct MilestoneAggregator {
    milestones: BTreeMap<String, AggregatedMilestone>,
    warnings: Vec<Warning>,
}

impl MilestoneAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one repository's milestones into the view.
    pub fn fold(&mut self, repo: &RepositoryRef, records: &[MilestoneRecord]) {
        for record in records {
            let Some(existing) = self.milestones.get_mut(&record.title) else {
                self.milestones.insert(
                    record.title.clone(),
                    AggregatedMilestone {
                        state: record.state,
                        due: record.due,
                        repos: BTreeSet::from([repo.clone()]),
                    },
                );
                continue;
            };

            let seen = || existing.repos.iter().cloned().collect::<Vec<_>>();
            if existing.state != record.state {
                self.warnings.push(Warning::StateDivergence {
                    title: record.title.clone(),
                    repo: repo.clone(),
                    state: record.state,
                    expected: existing.state,
                    seen: seen(),
                });
            }
            if existing.due != record.due {
                self.warnings.push(Warning::DateDivergence {
                    title: record.title.clone(),
                    repo: repo.clone(),
                    due: record.due,
                    expected: existing.due,
                    seen: seen(),
                });
            }
            existing.repos.insert(repo.clone());
        }
    }

    /// Flags every repository of `repos` missing from a title, then hands back the view.
    pub fn finish(mut self, repos: &[RepositoryRef]) -> Aggregation {
        for (title, milestone) in &self.milestones {
            for repo in repos {
                if !milestone.repos.contains(repo) {
                    self.warnings.push(Warning::MissingRepository {
                        title: title.clone(),
                        repo: repo.clone(),
                    });
                }
            }
        }

        Aggregation {
            milestones: self.milestones,
            warnings: self.warnings,
        }
    }
}

/// Fetches and folds every repository's milestones.
///
/// Any fetch failure aborts the whole aggregation: a partial view would read
/// as a complete consistency report.
pub async fn aggregate<A>(api: &A, repos: &[RepositoryRef]) -> Result<Aggregation>
where
    A: GitHubApi + ?Sized,
{
    let mut aggregator = MilestoneAggregator::new();
    for repo in repos {
        let records = api
            .list_milestones(repo)
            .await
            .map_err(|source| MilestoneError::fetch("listing milestones", repo, source))?;
        debug!(repo = %repo, count = records.len(), "folding milestones");
        aggregator.fold(repo, &records);
    }
    Ok(aggregator.finish(repos))
}
