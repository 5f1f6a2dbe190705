//! Advisory findings. Reported on the diagnostic stream, never fatal.

use std::fmt;

use crate::due_date::{self, DueDate};
use crate::github::milestones::MilestoneState;
use crate::github::repository::RepositoryRef;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Warning {
    /// A repository's milestone state differs from the first one seen for the title.
    StateDivergence {
        title: String,
        repo: RepositoryRef,
        state: MilestoneState,
        expected: MilestoneState,
        seen: Vec<RepositoryRef>,
    },
    /// A repository's due date differs from the first one seen for the title.
    DateDivergence {
        title: String,
        repo: RepositoryRef,
        due: Option<DueDate>,
        expected: Option<DueDate>,
        seen: Vec<RepositoryRef>,
    },
    /// A resolved repository lacks a title other repositories carry.
    MissingRepository { title: String, repo: RepositoryRef },
    /// An issue is still open under a milestone that is about to be closed.
    OpenIssue {
        title: String,
        repo: RepositoryRef,
        issue: u64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::StateDivergence {
                title,
                repo,
                state,
                expected,
                seen,
            } => write!(
                f,
                "milestone {title} in repo {repo} has a different state (has {state}, expect {expected}) than other repos ({})",
                join(seen),
            ),
            Warning::DateDivergence {
                title,
                repo,
                due,
                expected,
                seen,
            } => write!(
                f,
                "milestone {title} in repo {repo} has a different due date (has {}, expect {}) than other repos ({})",
                due_date::describe(due.as_ref()),
                due_date::describe(expected.as_ref()),
                join(seen),
            ),
            Warning::MissingRepository { title, repo } => {
                write!(f, "milestone {title} is missing from repo {repo}")
            }
            Warning::OpenIssue { title, repo, issue } => {
                write!(f, "issue #{issue} in repo {repo} still active in milestone {title}")
            }
        }
    }
}

fn join(repos: &[RepositoryRef]) -> String {
    repos
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
