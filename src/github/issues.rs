use serde::Deserialize;

/// Issue entry of `GET /repos/{owner}/{repo}/issues`. Pull requests come back
/// from the same endpoint and are kept.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct IssueRef {
    pub number: u64,
}
