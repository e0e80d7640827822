use std::path::PathBuf;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::services::SampleIssueService;

const BODY_COLUMN: &str = "body";

/// Sample issue bodies read from a CSV file on first use.
pub struct CsvSampleIssues {
    path: PathBuf,
    bodies: OnceCell<Vec<String>>,
}

impl CsvSampleIssues {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bodies: OnceCell::new(),
        }
    }

    pub async fn preload(&self) -> AppResult<usize> {
        self.bodies().await.map(|bodies| bodies.len())
    }

    async fn bodies(&self) -> AppResult<&[String]> {
        let bodies = self
            .bodies
            .get_or_try_init(|| async {
                let data = tokio::fs::read(&self.path).await.map_err(|err| {
                    AppError::ResourceUnavailable(format!(
                        "cannot read sample issues {}: {err}",
                        self.path.display()
                    ))
                })?;
                let bodies = parse_bodies(&data)?;
                info!(
                    path = %self.path.display(),
                    count = bodies.len(),
                    "sample issues loaded"
                );
                Ok::<_, AppError>(bodies)
            })
            .await?;
        Ok(bodies.as_slice())
    }
}

fn parse_bodies(data: &[u8]) -> AppResult<Vec<String>> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers().map_err(malformed)?.clone();
    let column = headers
        .iter()
        .position(|header| header.trim() == BODY_COLUMN)
        .ok_or_else(|| {
            AppError::ResourceUnavailable(format!("sample CSV has no '{BODY_COLUMN}' column"))
        })?;

    let mut bodies = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        match record.get(column) {
            Some(body) if !body.trim().is_empty() => bodies.push(body.to_string()),
            _ => {}
        }
    }

    if bodies.is_empty() {
        return Err(AppError::ResourceUnavailable(
            "sample CSV contains no issue bodies".to_string(),
        ));
    }
    Ok(bodies)
}

fn malformed(err: csv::Error) -> AppError {
    AppError::ResourceUnavailable(format!("malformed sample CSV: {err}"))
}

#[async_trait]
impl SampleIssueService for CsvSampleIssues {
    async fn random_issue(&self) -> AppResult<String> {
        let bodies = self.bodies().await?;
        let body = bodies
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| AppError::ResourceUnavailable("no sample issues".to_string()))?;
        debug!(chars = body.chars().count(), "random issue selected");
        Ok(body)
    }
}
