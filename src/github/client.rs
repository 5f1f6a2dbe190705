//! `reqwest` implementation of [`GitHubApi`] against the GitHub REST API.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::LINK;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::issues::IssueRef;
use super::milestones::{MilestonePatch, MilestoneRecord};
use super::repository::{RepositoryPage, RepositoryRef, RepositoryResponse};
use super::{ApiError, ApiResult, GitHubApi};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = "ghmm-cli";
const ACCEPT: &str = "application/vnd.github+json";
const PER_PAGE: u32 = 100;
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(api_url: &str, token: Option<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(RestClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.api_url, path))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }

    /// Fetches one page of a list endpoint and the page number that follows it, if any.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        page: Option<u32>,
    ) -> ApiResult<(Vec<T>, Option<u32>)> {
        let mut builder = self
            .request(Method::GET, path)
            .query(query)
            .query(&[("per_page", PER_PAGE)]);
        if let Some(page) = page {
            builder = builder.query(&[("page", page)]);
        }

        debug!(path, ?page, "GET");
        let response = Self::send(builder).await?;
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_from_link);
        let items = response.json::<Vec<T>>().await?;
        Ok((items, next_page))
    }

    /// Follows `Link: rel="next"` until the endpoint is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = None;
        loop {
            let (items, next_page) = self.get_page(path, query, page).await?;
            all.extend(items);
            match next_page {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(all)
    }
}

#[async_trait]
impl GitHubApi for RestClient {
    async fn list_org_repositories(
        &self,
        org: &str,
        page: Option<u32>,
    ) -> ApiResult<RepositoryPage> {
        let (repos, next_page) = self
            .get_page::<RepositoryResponse>(&format!("/orgs/{org}/repos"), &[], page)
            .await?;
        Ok(RepositoryPage {
            repositories: repos.into_iter().map(RepositoryRef::from).collect(),
            next_page,
        })
    }

    async fn list_milestones(&self, repo: &RepositoryRef) -> ApiResult<Vec<MilestoneRecord>> {
        self.get_all(
            &format!("/repos/{}/{}/milestones", repo.owner, repo.name),
            &[("state", "all".to_string())],
        )
        .await
    }

    async fn edit_milestone(
        &self,
        repo: &RepositoryRef,
        number: u64,
        patch: &MilestonePatch,
    ) -> ApiResult<MilestoneRecord> {
        let path = format!("/repos/{}/{}/milestones/{number}", repo.owner, repo.name);
        debug!(path, ?patch, "PATCH");
        let response = Self::send(self.request(Method::PATCH, &path).json(patch)).await?;
        Ok(response.json::<MilestoneRecord>().await?)
    }

    async fn list_open_issues(
        &self,
        repo: &RepositoryRef,
        milestone: u64,
    ) -> ApiResult<Vec<IssueRef>> {
        self.get_all(
            &format!("/repos/{}/{}/issues", repo.owner, repo.name),
            &[
                ("milestone", milestone.to_string()),
                ("state", "open".to_string()),
            ],
        )
        .await
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// GitHub's `message` field when the body carries one, else the body or the status reason.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(error) = serde_json::from_str::<ErrorResponse>(body) {
        return error.message;
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

/// Extracts the `page` parameter of the `rel="next"` entry of a `Link` header.
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|link| {
        let (target, params) = link.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = reqwest::Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
