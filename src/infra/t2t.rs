use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::prediction::Prediction;
use crate::domain::schema::ModelSchema;
use crate::domain::subword::SubwordEncoder;
use crate::error::{AppError, AppResult};
use crate::infra::serving::ServingClient;
use crate::services::SummarizerService;

/// Where the problem's subword vocabulary lives.
#[derive(Debug, Clone)]
pub struct VocabSource {
    pub problem_name: String,
    pub data_dir: PathBuf,
    pub vocab_file: Option<PathBuf>,
}

impl VocabSource {
    async fn resolve(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.vocab_file {
            return Ok(path.clone());
        }

        let prefix = format!("vocab.{}.", self.problem_name);
        let mut entries = tokio::fs::read_dir(&self.data_dir).await.map_err(|err| {
            AppError::ResourceUnavailable(format!(
                "cannot read data dir {}: {err}",
                self.data_dir.display()
            ))
        })?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with("subwords") {
                candidates.push(entry.path());
            }
        }
        candidates.sort();

        candidates.into_iter().next().ok_or_else(|| {
            AppError::ResourceUnavailable(format!(
                "no {prefix}*subwords vocabulary in {}",
                self.data_dir.display()
            ))
        })
    }

    async fn load(&self) -> AppResult<ModelSchema> {
        let path = self.resolve().await?;
        let contents = read_vocab(&path).await?;
        let encoder = SubwordEncoder::parse_vocab(&contents)?;
        info!(
            problem = %self.problem_name,
            vocab = %path.display(),
            vocab_size = encoder.vocab_size(),
            "model schema loaded"
        );
        Ok(ModelSchema::new(self.problem_name.clone(), encoder))
    }
}

async fn read_vocab(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|err| {
        AppError::ResourceUnavailable(format!(
            "cannot read vocabulary {}: {err}",
            path.display()
        ))
    })
}

pub struct T2tSummarizer {
    serving: ServingClient,
    vocab: VocabSource,
    schema: OnceCell<Arc<ModelSchema>>,
}

impl T2tSummarizer {
    pub fn new(serving: ServingClient, vocab: VocabSource) -> Self {
        Self {
            serving,
            vocab,
            schema: OnceCell::new(),
        }
    }

    async fn schema(&self) -> AppResult<Arc<ModelSchema>> {
        let schema = self
            .schema
            .get_or_try_init(|| async { self.vocab.load().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(schema))
    }
}

#[async_trait]
impl SummarizerService for T2tSummarizer {
    async fn warm_init(&self) -> AppResult<()> {
        let schema = self.schema().await?;
        debug!(
            problem = %schema.problem_name,
            vocab_size = schema.vocab_size(),
            "model schema ready"
        );
        Ok(())
    }

    async fn predict(&self, texts: &[String]) -> AppResult<Vec<Prediction>> {
        let schema = self.schema().await?;
        let examples = texts
            .iter()
            .map(|text| schema.serialize_input(text))
            .collect::<AppResult<Vec<_>>>()?;

        info!(
            problem = %schema.problem_name,
            endpoint = %self.serving.endpoint(),
            batch = examples.len(),
            "requesting predictions"
        );
        let raw = self.serving.predict(&examples).await?;
        if raw.len() != texts.len() {
            return Err(AppError::Upstream(format!(
                "model server returned {} predictions for {} inputs",
                raw.len(),
                texts.len()
            )));
        }

        Ok(raw
            .iter()
            .map(|prediction| Prediction {
                summary: schema.decode_output(prediction.output_ids()),
                score: prediction.score(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::prelude::{BASE64_STANDARD, Engine as _};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::example::Example;

    const VOCAB: &str = "'<pad>'\n'<EOS>'\n'hello_'\n'crash_'\n'on_'\n'start_'\n";

    fn data_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vocab.gh_problem.8192.subwords"), VOCAB).unwrap();
        dir
    }

    fn summarizer(server: &MockServer, data_dir: &Path) -> T2tSummarizer {
        let serving = ServingClient::new(
            format!("{}/v1/models/ghsumm:predict", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        T2tSummarizer::new(
            serving,
            VocabSource {
                problem_name: "gh_problem".to_string(),
                data_dir: data_dir.to_path_buf(),
                vocab_file: None,
            },
        )
    }

    #[tokio::test]
    async fn predicts_single_summary() {
        let dir = data_dir();
        let server = MockServer::start().await;
        let expected_b64 =
            BASE64_STANDARD.encode(Example::with_int64_feature("inputs", &[2, 1]).to_bytes());
        Mock::given(method("POST"))
            .and(path("/v1/models/ghsumm:predict"))
            .and(body_json(json!({ "instances": [{ "input": { "b64": expected_b64 } }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "predictions": [{ "outputs": [3, 4, 5, 1, 0], "scores": -0.7 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let predictions = summarizer(&server, dir.path())
            .predict(&["hello".to_string()])
            .await
            .unwrap();

        assert_eq!(
            predictions,
            vec![Prediction {
                summary: "crash on start".to_string(),
                score: -0.7,
            }]
        );
    }

    #[tokio::test]
    async fn prediction_count_mismatch_is_upstream_error() {
        let dir = data_dir();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "predictions": [
                    { "outputs": [3, 1], "scores": -0.1 },
                    { "outputs": [4, 1], "scores": -0.2 }
                ]
            })))
            .mount(&server)
            .await;

        let summarizer = summarizer(&server, dir.path());
        let err = summarizer.predict(&["hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        server.reset().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "predictions": [] })),
            )
            .mount(&server)
            .await;
        let err = summarizer.predict(&["hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn warm_init_is_idempotent_under_concurrency() {
        let dir = data_dir();
        let server = MockServer::start().await;
        let summarizer = summarizer(&server, dir.path());

        let (first, second) = tokio::join!(summarizer.warm_init(), summarizer.warm_init());
        first.unwrap();
        second.unwrap();
        summarizer.warm_init().await.unwrap();

        let a = summarizer.schema().await.unwrap();
        let b = summarizer.schema().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn missing_vocabulary_is_resource_unavailable() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;

        let err = summarizer(&server, dir.path()).warm_init().await.unwrap_err();
        assert!(matches!(err, AppError::ResourceUnavailable(_)));
    }

    #[tokio::test]
    async fn explicit_vocab_file_wins_over_data_dir() {
        let dir = TempDir::new().unwrap();
        let vocab_path = dir.path().join("custom.subwords");
        std::fs::write(&vocab_path, VOCAB).unwrap();

        let source = VocabSource {
            problem_name: "gh_problem".to_string(),
            data_dir: dir.path().join("missing"),
            vocab_file: Some(vocab_path.clone()),
        };
        assert_eq!(source.resolve().await.unwrap(), vocab_path);
        assert_eq!(source.load().await.unwrap().vocab_size(), 6);
    }
}
