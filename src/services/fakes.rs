use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::prediction::Prediction;
use crate::error::{AppError, AppResult};
use crate::services::{IssueFetcherService, SampleIssueService, SummarizerService};

pub struct StaticSamples(pub Vec<String>);

#[async_trait]
impl SampleIssueService for StaticSamples {
    async fn random_issue(&self) -> AppResult<String> {
        self.0
            .first()
            .cloned()
            .ok_or_else(|| AppError::ResourceUnavailable("no sample issues".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingFetcher {
    pub body: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn returning(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueFetcherService for RecordingFetcher {
    async fn fetch_issue_body(&self, issue_url: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(issue_url.to_string());
        self.body
            .clone()
            .ok_or_else(|| AppError::Upstream("GitHub issue has no body".to_string()))
    }
}

pub enum SummarizerBehavior {
    Echo,
    Fail,
    Empty,
}

pub struct RecordingSummarizer {
    pub behavior: SummarizerBehavior,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingSummarizer {
    pub fn new(behavior: SummarizerBehavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizerService for RecordingSummarizer {
    async fn warm_init(&self) -> AppResult<()> {
        Ok(())
    }

    async fn predict(&self, texts: &[String]) -> AppResult<Vec<Prediction>> {
        self.calls.lock().unwrap().push(texts.to_vec());
        match self.behavior {
            SummarizerBehavior::Echo => Ok(texts
                .iter()
                .map(|text| Prediction {
                    summary: format!("summary of {text}"),
                    score: -0.5,
                })
                .collect()),
            SummarizerBehavior::Fail => Err(AppError::Upstream(
                "model server responded with 500 Internal Server Error".to_string(),
            )),
            SummarizerBehavior::Empty => Ok(Vec::new()),
        }
    }
}

pub fn context(
    samples: Arc<dyn SampleIssueService>,
    issue_fetcher: Arc<dyn IssueFetcherService>,
    summarizer: Arc<dyn SummarizerService>,
) -> AppContext {
    AppContext::new(
        AppConfig::from_lookup(|_| None),
        samples,
        issue_fetcher,
        summarizer,
    )
}
