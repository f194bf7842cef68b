//! REST client for the GitHub repository endpoints used by the importer.

use axum::http::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use folio_core::import::GithubRepository;

/// Repositories requested per listing call (GitHub's maximum page size).
const PER_PAGE: u32 = 100;

/// HTTP client for the GitHub REST API.
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the GitHub REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// GitHub returned a non-2xx status code.
    #[error("GitHub API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl GithubClient {
    /// Create a client for the API rooted at `api_url`,
    /// e.g. `https://api.github.com`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public repositories of `username`, most recently updated first.
    pub async fn list_repositories(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<Vec<GithubRepository>, GithubError> {
        let url = format!(
            "{}/users/{}/repos?per_page={PER_PAGE}&sort=updated",
            self.api_url,
            username.trim()
        );
        let response = self.request(&url, token).send().await?;
        Self::parse_response(response).await
    }

    /// A single repository by owner and name.
    pub async fn get_repository(
        &self,
        owner: &str,
        name: &str,
        token: Option<&str>,
    ) -> Result<GithubRepository, GithubError> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner.trim(), name.trim());
        let response = self.request(&url, token).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn request(&self, url: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("folio/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/vnd.github+json");
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Parse a successful JSON response body into the expected type, or
    /// return [`GithubError::ApiError`] with the status and body text.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GithubError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GithubError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
