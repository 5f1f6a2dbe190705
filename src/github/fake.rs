//! In-memory GitHub shared by the unit tests and the acceptance suite.
//!
//! Built with `cfg(test)` or the `test-support` feature.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::issues::IssueRef;
use super::milestones::{MilestonePatch, MilestoneRecord, MilestoneState};
use super::repository::{RepositoryPage, RepositoryRef};
use super::{ApiError, ApiResult, GitHubApi};
use crate::due_date::DueDate;

#[derive(Debug, Default)]
pub struct FakeGitHub {
    org_pages: BTreeMap<String, Vec<Vec<RepositoryRef>>>,
    milestones: Mutex<BTreeMap<RepositoryRef, Vec<MilestoneRecord>>>,
    issues: BTreeMap<(RepositoryRef, u64), Vec<IssueRef>>,
    failing_pages: HashSet<(String, u32)>,
    failing_repos: HashSet<RepositoryRef>,
    read_only: HashSet<RepositoryRef>,
    failing_edits: HashSet<(RepositoryRef, u64)>,
    failing_issue_lists: HashSet<(RepositoryRef, u64)>,
    requests: Mutex<Vec<String>>,
    pub page_requests: Mutex<Vec<Option<u32>>>,
    pub edits: Mutex<Vec<(RepositoryRef, u64, MilestonePatch)>>,
}

pub fn repo(full_name: &str) -> RepositoryRef {
    RepositoryRef::parse(full_name).expect("owner/name")
}

pub fn milestone(
    number: u64,
    title: &str,
    state: MilestoneState,
    due: Option<&str>,
) -> MilestoneRecord {
    MilestoneRecord {
        number,
        title: title.to_string(),
        state,
        due: due.map(|d| DueDate::parse(d).expect("valid due date")),
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Not Found".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies a patch the way GitHub does: unset fields are left alone.
fn apply(patch: &MilestonePatch, record: &mut MilestoneRecord) {
    if let Some(due) = patch.due {
        record.due = Some(due);
    }
    if let Some(state) = patch.state {
        record.state = state;
    }
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_org_pages(&mut self, org: &str, pages: Vec<Vec<RepositoryRef>>) {
        self.org_pages.insert(org.to_string(), pages);
    }

    pub fn add_milestone(&mut self, full_name: &str, record: MilestoneRecord) {
        self.milestones
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(repo(full_name))
            .or_default()
            .push(record);
    }

    pub fn add_open_issues(&mut self, full_name: &str, milestone: u64, numbers: &[u64]) {
        let issues = numbers.iter().map(|&number| IssueRef { number }).collect();
        self.issues.insert((repo(full_name), milestone), issues);
    }

    /// Every milestone listing of the repository fails.
    pub fn fail_listing(&mut self, full_name: &str) {
        self.failing_repos.insert(repo(full_name));
    }

    /// Every milestone edit in the repository fails.
    pub fn fail_edits(&mut self, full_name: &str) {
        self.read_only.insert(repo(full_name));
    }

    pub fn with_org_pages(mut self, org: &str, pages: Vec<Vec<&str>>) -> Self {
        let pages = pages
            .into_iter()
            .map(|page| page.into_iter().map(repo).collect())
            .collect();
        self.add_org_pages(org, pages);
        self
    }

    pub fn with_milestones(mut self, full_name: &str, records: Vec<MilestoneRecord>) -> Self {
        for record in records {
            self.add_milestone(full_name, record);
        }
        self
    }

    pub fn with_open_issues(mut self, full_name: &str, milestone: u64, numbers: &[u64]) -> Self {
        self.add_open_issues(full_name, milestone, numbers);
        self
    }

    pub fn failing_page(mut self, org: &str, page: u32) -> Self {
        self.failing_pages.insert((org.to_string(), page));
        self
    }

    pub fn failing_repo(mut self, full_name: &str) -> Self {
        self.fail_listing(full_name);
        self
    }

    pub fn failing_edit(mut self, full_name: &str, number: u64) -> Self {
        self.failing_edits.insert((repo(full_name), number));
        self
    }

    pub fn failing_issue_list(mut self, full_name: &str, milestone: u64) -> Self {
        self.failing_issue_lists.insert((repo(full_name), milestone));
        self
    }

    /// Successful edits so far.
    pub fn edit_count(&self) -> usize {
        lock(&self.edits).len()
    }

    /// Every call made against the fake, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    /// Current remote copy of one milestone.
    pub fn find_milestone(&self, full_name: &str, number: u64) -> Option<MilestoneRecord> {
        lock(&self.milestones)
            .get(&repo(full_name))
            .and_then(|records| records.iter().find(|r| r.number == number).cloned())
    }

    fn record(&self, request: String) {
        lock(&self.requests).push(request);
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn list_org_repositories(
        &self,
        org: &str,
        page: Option<u32>,
    ) -> ApiResult<RepositoryPage> {
        lock(&self.page_requests).push(page);
        let number = page.unwrap_or(1);
        self.record(format!("repos {org} {number}"));
        if self.failing_pages.contains(&(org.to_string(), number)) {
            return Err(ApiError::Status {
                status: 502,
                message: "Bad Gateway".to_string(),
            });
        }
        let pages = self.org_pages.get(org).ok_or_else(not_found)?;
        let index = number as usize - 1;
        let repositories = pages.get(index).cloned().unwrap_or_default();
        let next_page = (index + 1 < pages.len()).then_some(number + 1);
        Ok(RepositoryPage {
            repositories,
            next_page,
        })
    }

    async fn list_milestones(&self, repo: &RepositoryRef) -> ApiResult<Vec<MilestoneRecord>> {
        self.record(format!("milestones {repo}"));
        if self.failing_repos.contains(repo) {
            return Err(not_found());
        }
        Ok(lock(&self.milestones)
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        patch: &MilestonePatch,
    ) -> ApiResult<MilestoneRecord> {
        self.record(format!("edit {repo} {number}"));
        if self.read_only.contains(repo) {
            return Err(ApiError::Status {
                status: 403,
                message: "Resource not accessible by integration".to_string(),
            });
        }
        if self.failing_edits.contains(&(repo.clone(), number)) {
            return Err(ApiError::Status {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        let mut milestones = lock(&self.milestones);
        let record = milestones
            .get_mut(repo)
            .and_then(|records| records.iter_mut().find(|r| r.number == number))
            .ok_or_else(not_found)?;
        apply(patch, record);
        lock(&self.edits).push((repo.clone(), number, patch.clone()));
        Ok(record.clone())
    }

    async fn list_open_issues(
        &self,
        repo: &RepositoryRef,
        milestone: u64,
    ) -> ApiResult<Vec<IssueRef>> {
        self.record(format!("issues {repo} {milestone}"));
        if self.failing_issue_lists.contains(&(repo.clone(), milestone)) {
            return Err(not_found());
        }
        Ok(self
            .issues
            .get(&(repo.clone(), milestone))
            .cloned()
            .unwrap_or_default())
    }
}
