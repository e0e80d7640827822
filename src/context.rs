use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{IssueFetcherService, SampleIssueService, SummarizerService};

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub samples: Arc<dyn SampleIssueService>,
    pub issue_fetcher: Arc<dyn IssueFetcherService>,
    pub summarizer: Arc<dyn SummarizerService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        samples: Arc<dyn SampleIssueService>,
        issue_fetcher: Arc<dyn IssueFetcherService>,
        summarizer: Arc<dyn SummarizerService>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            samples,
            issue_fetcher,
            summarizer,
        }
    }
}
