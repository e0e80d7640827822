use std::time::Duration;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Client for the TensorFlow Serving REST `:predict` endpoint.
pub struct ServingClient {
    http: Client,
    endpoint: String,
}

impl ServingClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| {
            AppError::Configuration(format!("failed to build HTTP client: {err}"))
        })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends serialized examples and returns the raw predictions in order.
    pub async fn predict(&self, examples: &[Vec<u8>]) -> AppResult<Vec<RawPrediction>> {
        let request_body = PredictRequest::new(examples);

        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AppError::Upstream(format!("model server timed out: {err}"))
                } else {
                    AppError::Upstream(format!("failed to call model server: {err}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AppError::Upstream(format!("failed to read model response: {err}"))
        })?;
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "model server responded with {status}: {body}"
            )));
        }

        let payload: PredictResponse = serde_json::from_str(&body).map_err(|err| {
            AppError::Upstream(format!("failed to parse model response: {err}"))
        })?;
        debug!(count = payload.predictions.len(), "predictions received");

        Ok(payload.predictions)
    }
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
}

impl PredictRequest {
    fn new(examples: &[Vec<u8>]) -> Self {
        Self {
            instances: examples
                .iter()
                .map(|example| Instance {
                    input: B64Value {
                        b64: BASE64_STANDARD.encode(example),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Instance {
    input: B64Value,
}

#[derive(Serialize)]
struct B64Value {
    b64: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<RawPrediction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    outputs: OutputIds,
    scores: Scores,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OutputIds {
    Single(Vec<i64>),
    Beams(Vec<Vec<i64>>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scores {
    Single(f64),
    Beams(Vec<f64>),
}

impl RawPrediction {
    /// Output ids of the best beam.
    pub fn output_ids(&self) -> &[i64] {
        match &self.outputs {
            OutputIds::Single(ids) => ids,
            OutputIds::Beams(beams) => beams.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub fn score(&self) -> f64 {
        match &self.scores {
            Scores::Single(score) => *score,
            Scores::Beams(scores) => scores.first().copied().unwrap_or(f64::NEG_INFINITY),
        }
    }
}
