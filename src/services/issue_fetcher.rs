use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait IssueFetcherService: Send + Sync {
    async fn fetch_issue_body(&self, issue_url: &str) -> AppResult<String>;
}
