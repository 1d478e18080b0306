use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub login: String,
    pub avatar_url: String,
}

/// Response of `GET /repos/{owner}/{name}`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub owner: Owner,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IssueAuthor {
    pub login: String,
}

/// One element of `GET /repos/{owner}/{name}/issues`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub id: IssueId,
    pub title: String,
    pub html_url: String,
    pub user: IssueAuthor,
}

/// Issue id as text. GitHub sends a number; string ids are accepted too.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl<'de> Deserialize<'de> for IssueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => IssueId(n.to_string()),
            Raw::Text(s) => IssueId(s),
        })
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
