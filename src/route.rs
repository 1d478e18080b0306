use crate::error::{ExplorerError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Path of the root view, the target of the back link.
pub const ROOT_PATH: &str = "/";

const REPOSITORY_PREFIX: &str = "/repositories/";

/// A repository identifier of the form `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepositoryId(String);

impl RepositoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// GitHub owner and repository names: ASCII alphanumerics, `-`, `_` and `.`,
/// never `.` or `..` on their own.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl FromStr for RepositoryId {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.split_once('/') {
            Some((owner, name)) if is_valid_segment(owner) && is_valid_segment(name) => {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(ExplorerError::InvalidRoute(format!(
                "expected owner/name, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Repository(RepositoryId),
}

impl Route {
    /// Resolve a navigation path. A bare `owner/name` is shorthand for
    /// `/repositories/owner/name`.
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim();
        if path.is_empty() || path == ROOT_PATH {
            return Ok(Route::Dashboard);
        }

        if let Some(rest) = path.strip_prefix(REPOSITORY_PREFIX) {
            return rest.parse().map(Route::Repository);
        }

        if path.starts_with('/') {
            return Err(ExplorerError::InvalidRoute(format!("no route for '{}'", path)));
        }

        path.parse().map(Route::Repository)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => ROOT_PATH.to_string(),
            Route::Repository(id) => format!("{}{}", REPOSITORY_PREFIX, id),
        }
    }
}
