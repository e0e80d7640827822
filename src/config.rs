use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SERVING_PORT: u16 = 8500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_name: String,
    pub problem_name: String,
    pub t2t_usr_dir: String,
    pub hparams_name: String,
    pub data_dir: PathBuf,
    pub vocab_file: Option<PathBuf>,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub serving_host: String,
    pub serving_port: u16,
    pub servable_name: String,
    pub sample_issues: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let serving_port = get("TFSERVING_PORT")
            .and_then(|port| port.trim().parse().ok())
            .unwrap_or(DEFAULT_SERVING_PORT);
        let timeout_secs = get("HTTP_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            model_name: or("MODEL_NAME", "ghsumm"),
            problem_name: or("PROBLEM_NAME", "gh_problem"),
            t2t_usr_dir: or("T2T_USR_DIR", "ghsumm/trainer"),
            hparams_name: or("HPARAMS", "transformer_prepend"),
            data_dir: PathBuf::from(or("DATADIR", "./t2t_data")),
            vocab_file: get("VOCAB_FILE").map(PathBuf::from),
            github_token: get("GH_TOKEN"),
            github_api_url: or("GITHUB_API_URL", "https://api.github.com"),
            serving_host: or("TFSERVING_HOST", "ghsumm.kubeflow"),
            serving_port,
            servable_name: or("TF_SERVABLE_NAME", "ghsumm"),
            sample_issues: PathBuf::from(or("SAMPLE_ISSUES", "./github_issues_sample.csv")),
            http_timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn predict_url(&self) -> String {
        format!(
            "http://{}:{}/v1/models/{}:predict",
            self.serving_host, self.serving_port, self.servable_name
        )
    }
}
