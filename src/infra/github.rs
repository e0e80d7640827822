use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::services::IssueFetcherService;

static GITHUB_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/")
        .expect("github prefix pattern is valid")
});

pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| {
            AppError::Configuration(format!("failed to build HTTP client: {err}"))
        })?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            token,
        })
    }

    /// Maps `https://github.com/<owner>/<repo>/issues/<n>` onto the REST API.
    pub fn api_url(&self, issue_url: &str) -> AppResult<String> {
        let issue_url = issue_url.trim();
        let path = match GITHUB_PREFIX.find(issue_url) {
            Some(prefix) => &issue_url[prefix.end()..],
            None => {
                return Err(AppError::BadRequest(format!(
                    "not a github.com issue URL: {issue_url}"
                )));
            }
        };

        Ok(format!(
            "{}/repos/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

#[async_trait]
impl IssueFetcherService for GitHubClient {
    async fn fetch_issue_body(&self, issue_url: &str) -> AppResult<String> {
        let api_url = self.api_url(issue_url)?;
        info!(%api_url, "fetching issue");

        let mut request = self
            .http
            .get(&api_url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("ghsumm/", env!("CARGO_PKG_VERSION")));
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                AppError::Upstream(format!("GitHub request timed out: {err}"))
            } else {
                AppError::Upstream(format!("failed to call GitHub: {err}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Upstream(format!(
                "GitHub responded with {status}: {body}"
            )));
        }

        let payload: IssuePayload = response.json().await.map_err(|err| {
            AppError::Upstream(format!("failed to parse GitHub response: {err}"))
        })?;
        debug!(has_body = payload.body.is_some(), "issue fetched");

        payload
            .body
            .ok_or_else(|| AppError::Upstream("GitHub issue has no body".to_string()))
    }
}

#[derive(Deserialize)]
struct IssuePayload {
    body: Option<String>,
}
