use crate::models::{IssueSummary, RepositorySummary};
use crate::route::RepositoryId;

/// Remote data held by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remote<T> {
    NotLoaded,
    Loaded(T),
    Failed(String),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Remote::NotLoaded
    }
}

impl<T> Remote<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Remote::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Remote::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Remote<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Remote::Loaded(value),
            Err(e) => Remote::Failed(e.to_string()),
        }
    }
}

/// State of one `RepositoryView`. The two slots are written independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Bumped on every navigation; fetches issued under an older value are dropped.
    pub generation: u64,
    pub repository: Option<RepositoryId>,
    pub summary: Remote<RepositorySummary>,
    pub issues: Remote<Vec<IssueSummary>>,
}

impl ViewState {
    /// Start a new generation for `repository`, clearing both slots.
    pub fn begin(&mut self, repository: Option<RepositoryId>) -> u64 {
        self.generation += 1;
        self.repository = repository;
        self.summary = Remote::NotLoaded;
        self.issues = Remote::NotLoaded;
        self.generation
    }
}
