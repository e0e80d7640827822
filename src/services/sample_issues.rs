use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait SampleIssueService: Send + Sync {
    async fn random_issue(&self) -> AppResult<String>;
}
