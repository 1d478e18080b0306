//! In-memory `RepositorySource` and fixtures shared by the view and session tests.

use crate::error::{ExplorerError, Result};
use crate::github_client::RepositorySource;
use crate::models::{IssueAuthor, IssueId, IssueSummary, Owner, RepositorySummary};
use crate::route::RepositoryId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn summary(full_name: &str, stars: u64) -> RepositorySummary {
    RepositorySummary {
        full_name: full_name.to_string(),
        description: None,
        stargazers_count: stars,
        forks_count: 0,
        open_issues_count: 0,
        owner: Owner {
            login: "owner".to_string(),
            avatar_url: "https://avatars/owner.png".to_string(),
        },
    }
}

pub fn issue(id: &str, title: &str) -> IssueSummary {
    IssueSummary {
        id: IssueId(id.to_string()),
        title: title.to_string(),
        html_url: format!("https://x/{}", id),
        user: IssueAuthor {
            login: "alice".to_string(),
        },
    }
}

/// In-memory source. Repositories with a gate block until it gets permits.
#[derive(Default)]
pub struct FakeSource {
    pub repositories: HashMap<String, RepositorySummary>,
    pub issues: HashMap<String, Vec<IssueSummary>>,
    pub gates: HashMap<String, Arc<Semaphore>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_repository(mut self, id: &str, stars: u64, issues: Vec<IssueSummary>) -> Self {
        self.repositories.insert(id.to_string(), summary(id, stars));
        self.issues.insert(id.to_string(), issues);
        self
    }

    pub fn gated(mut self, id: &str) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(id.to_string(), Arc::clone(&gate));
        (self, gate)
    }

    async fn wait_gate(&self, id: &RepositoryId) {
        if let Some(gate) = self.gates.get(id.as_str()) {
            gate.acquire().await.unwrap().forget();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn get_repository(&self, id: &RepositoryId) -> Result<RepositorySummary> {
        self.calls.lock().unwrap().push(format!("repo:{}", id));
        self.wait_gate(id).await;
        self.repositories
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(id.to_string()))
    }

    async fn list_issues(&self, id: &RepositoryId) -> Result<Vec<IssueSummary>> {
        self.calls.lock().unwrap().push(format!("issues:{}", id));
        self.wait_gate(id).await;
        self.issues
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ExplorerError::NotFound(id.to_string()))
    }
}

pub fn id(s: &str) -> RepositoryId {
    s.parse().unwrap()
}

