//! Error taxonomy for the reconciliation engine.
//!
//! Advisory findings (divergent state, missing repositories, open issues) are
//! not errors; see [`crate::warning::Warning`].

use thiserror::Error;

use crate::github::ApiError;
use crate::github::repository::RepositoryRef;

#[derive(Debug, Error)]
pub enum MilestoneError {
    /// Repository or organization discovery failed. Always fatal.
    #[error("listing repos by org {org}")]
    Lookup {
        org: String,
        #[source]
        source: ApiError,
    },

    /// Listing milestones or issues failed.
    #[error("{action} in repo {repo}")]
    Fetch {
        action: String,
        repo: RepositoryRef,
        #[source]
        source: ApiError,
    },

    /// A single edit call failed.
    #[error("{action} milestone {title} (#{number}) in repo {repo}")]
    Mutation {
        action: &'static str,
        title: String,
        number: u64,
        repo: RepositoryRef,
        #[source]
        source: ApiError,
    },

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Missing or malformed input, rejected before any remote call.
    #[error("{0}")]
    Argument(String),

    #[error("writing output")]
    Output(#[from] std::io::Error),
}

impl MilestoneError {
    pub(crate) fn fetch(action: impl Into<String>, repo: &RepositoryRef, source: ApiError) -> Self {
        MilestoneError::Fetch {
            action: action.into(),
            repo: repo.clone(),
            source,
        }
    }

    /// Whether the error ends the whole invocation regardless of where it is raised.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MilestoneError::Lookup { .. }
                | MilestoneError::NotImplemented(_)
                | MilestoneError::Argument(_)
                | MilestoneError::Output(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MilestoneError>;
