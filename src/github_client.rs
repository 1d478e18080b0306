use crate::error::{ExplorerError, Result};
use crate::models::{IssueSummary, RepositorySummary};
use crate::route::RepositoryId;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where repository data comes from. `RepositoryView` only sees this trait.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn get_repository(&self, id: &RepositoryId) -> Result<RepositorySummary>;
    async fn list_issues(&self, id: &RepositoryId) -> Result<Vec<IssueSummary>>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct GithubClient {
    client: Arc<reqwest::Client>,
    base_url: String,
}

impl GithubClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("github-explorer"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));
        if let Some(token) = &config.token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("token {}", token))?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, id: &RepositoryId, path: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, id.as_str(), path)
    }

    async fn check_response(id: &RepositoryId, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ExplorerError::NotFound(id.to_string()));
        }

        if status == StatusCode::FORBIDDEN {
            let exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                == Some("0");
            if exhausted {
                return Err(ExplorerError::RateLimited);
            }
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    body
                }
            });

        Err(ExplorerError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RepositorySource for GithubClient {
    async fn get_repository(&self, id: &RepositoryId) -> Result<RepositorySummary> {
        let url = self.repo_url(id, "");
        tracing::debug!(%url, "fetching repository");
        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(id, response).await?;
        Ok(response.json().await?)
    }

    async fn list_issues(&self, id: &RepositoryId) -> Result<Vec<IssueSummary>> {
        let url = self.repo_url(id, "/issues");
        tracing::debug!(%url, "fetching issues");
        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(id, response).await?;
        Ok(response.json().await?)
    }
}
