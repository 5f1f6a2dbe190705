//! The slice of the GitHub REST API the milestone engine needs.
//!
//! Everything above this module talks to GitHub through [`GitHubApi`], so the
//! engine can be driven by [`client::RestClient`] in production and by an
//! in-memory fake in tests.

pub mod client;
pub mod issues;
pub mod milestones;
pub mod repository;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;

use issues::IssueRef;
use milestones::{MilestonePatch, MilestoneRecord};
use repository::{RepositoryPage, RepositoryRef};

/// Transport-level failures of a single GitHub call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// One page of an organization's repositories. `page` is `None` for the first page.
    async fn list_org_repositories(&self, org: &str, page: Option<u32>)
    -> ApiResult<RepositoryPage>;

    /// Every milestone of the repository, open and closed.
    async fn list_milestones(&self, repo: &RepositoryRef) -> ApiResult<Vec<MilestoneRecord>>;

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        patch: &MilestonePatch,
    ) -> ApiResult<MilestoneRecord>;

    /// Issues still open under the given milestone number.
    async fn list_open_issues(&self, repo: &RepositoryRef, milestone: u64)
    -> ApiResult<Vec<IssueRef>>;
}
