use async_trait::async_trait;

use crate::domain::prediction::Prediction;
use crate::error::AppResult;

#[async_trait]
pub trait SummarizerService: Send + Sync {
    /// Loads model metadata. Safe to call repeatedly and concurrently.
    async fn warm_init(&self) -> AppResult<()>;

    /// Returns one prediction per input text, in input order.
    async fn predict(&self, texts: &[String]) -> AppResult<Vec<Prediction>>;
}
