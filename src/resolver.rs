//! Turns a command-line target into the repositories to operate on.

use tracing::{debug, info};

use crate::error::{MilestoneError, Result};
use crate::github::GitHubApi;
use crate::github::repository::RepositoryRef;

/// Resolves `owner/name` to that single repository, or an organization name to
/// every repository it owns.
///
/// Explicit repositories are not checked for existence; a typo surfaces on the
/// first fetch. Organization membership is all-or-nothing: if any page fails,
/// the pages already retrieved are dropped and a [`MilestoneError::Lookup`] is
/// returned.
pub async fn resolve<A>(api: &A, target: &str) -> Result<Vec<RepositoryRef>>
where
    A: GitHubApi + ?Sized,
{
    let target = target.trim();
    if target.is_empty() {
        return Err(MilestoneError::Argument(
            "missing repo or organization name".to_string(),
        ));
    }

    if let Some(repo) = RepositoryRef::parse(target) {
        return Ok(vec![repo]);
    }

    let mut repos = Vec::new();
    let mut page = None;
    loop {
        let result = api
            .list_org_repositories(target, page)
            .await
            .map_err(|source| MilestoneError::Lookup {
                org: target.to_string(),
                source,
            })?;
        debug!(org = target, ?page, count = result.repositories.len(), "fetched repository page");
        repos.extend(result.repositories);

        match result.next_page {
            Some(next) => page = Some(next),
            None => break,
        }
    }

    info!(org = target, count = repos.len(), "resolved organization");
    Ok(repos)
}
