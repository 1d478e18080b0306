use crate::error::Result;
use crate::github_client::RepositorySource;
use crate::models::{IssueSummary, RepositorySummary};
use crate::route::RepositoryId;
use crate::state::{Remote, ViewState};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Holds the data of one repository page and keeps it in step with the
/// identifier it was last navigated to.
///
/// Each navigation issues the metadata request and the issue-list request as
/// two independent tasks. Whichever resolves first is applied first; a
/// resolution belonging to an earlier navigation is discarded.
#[derive(Clone)]
pub struct RepositoryView {
    source: Arc<dyn RepositorySource>,
    state: Arc<Mutex<ViewState>>,
    revision: Arc<watch::Sender<u64>>,
}

/// The two in-flight fetches of one navigation.
pub struct FetchHandle {
    summary: JoinHandle<bool>,
    issues: JoinHandle<bool>,
}

/// Whether each fetch of a navigation ended up written to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub summary_applied: bool,
    pub issues_applied: bool,
}

impl FetchHandle {
    pub async fn settled(self) -> Settled {
        let (summary, issues) = futures::future::join(self.summary, self.issues).await;
        Settled {
            summary_applied: summary.unwrap_or(false),
            issues_applied: issues.unwrap_or(false),
        }
    }
}

impl RepositoryView {
    pub fn new(source: Arc<dyn RepositorySource>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            source,
            state: Arc::new(Mutex::new(ViewState::default())),
            revision: Arc::new(revision),
        }
    }

    /// Show `id`: clear the page and fetch its metadata and issues concurrently.
    pub async fn navigate(&self, id: RepositoryId) -> FetchHandle {
        let generation = self.state.lock().await.begin(Some(id.clone()));
        tracing::debug!(repository = %id, generation, "navigating");
        self.notify();

        let source = Arc::clone(&self.source);
        let summary_id = id.clone();
        let summary = self.spawn_fetch(
            generation,
            "summary",
            async move { source.get_repository(&summary_id).await },
            summary_slot,
        );

        let source = Arc::clone(&self.source);
        let issues = self.spawn_fetch(
            generation,
            "issues",
            async move { source.list_issues(&id).await },
            issues_slot,
        );

        FetchHandle {
            summary,
            issues,
        }
    }

    /// Leave the page. Fetches still in flight will be discarded.
    pub async fn leave(&self) {
        let generation = self.state.lock().await.begin(None);
        tracing::debug!(generation, "left repository view");
        self.notify();
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    pub async fn current(&self) -> Option<RepositoryId> {
        self.state.lock().await.repository.clone()
    }

    /// Receives a new revision number each time the view's state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn spawn_fetch<T, Fut>(
        &self,
        generation: u64,
        slot_name: &'static str,
        fetch: Fut,
        slot: fn(&mut ViewState) -> &mut Remote<T>,
    ) -> JoinHandle<bool>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let view = self.clone();
        tokio::spawn(async move {
            let outcome = fetch.await;

            let mut state = view.state.lock().await;
            if state.generation != generation {
                tracing::debug!(
                    slot = slot_name,
                    generation,
                    current = state.generation,
                    "discarding stale response"
                );
                return false;
            }

            if let Err(e) = &outcome {
                tracing::warn!(
                    slot = slot_name,
                    repository = ?state.repository,
                    error = %e,
                    "fetch failed"
                );
            }
            *slot(&mut state) = Remote::from(outcome);
            drop(state);

            view.notify();
            true
        })
    }
}

fn summary_slot(state: &mut ViewState) -> &mut Remote<RepositorySummary> {
    &mut state.summary
}

fn issues_slot(state: &mut ViewState) -> &mut Remote<Vec<IssueSummary>> {
    &mut state.issues
}
