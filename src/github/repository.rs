use std::fmt;

use serde::Deserialize;

/// One repository, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryRef {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Splits `owner/name` at the first separator. Returns `None` for a bare name.
    pub fn parse(full_name: &str) -> Option<Self> {
        full_name
            .split_once('/')
            .map(|(owner, name)| RepositoryRef::new(owner, name))
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A page of organization members plus the provider's next-page signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryPage {
    pub repositories: Vec<RepositoryRef>,
    pub next_page: Option<u32>,
}

/// Repository entry of `GET /orgs/{org}/repos`.
#[derive(Deserialize, Debug)]
pub struct RepositoryResponse {
    pub name: String,
    pub owner: OwnerResponse,
}

#[derive(Deserialize, Debug)]
pub struct OwnerResponse {
    pub login: String,
}

impl From<RepositoryResponse> for RepositoryRef {
    fn from(response: RepositoryResponse) -> Self {
        RepositoryRef::new(response.owner.login, response.name)
    }
}
