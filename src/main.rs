mod config;
mod context;
mod domain;
mod error;
mod infra;
mod server;
mod services;
mod workflow;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::github::GitHubClient;
use crate::infra::samples::CsvSampleIssues;
use crate::infra::serving::ServingClient;
use crate::infra::t2t::{T2tSummarizer, VocabSource};
use crate::services::SummarizerService;

#[derive(Parser)]
#[command(name = "ghsumm", author, version, about = "GitHub issue summarization web app")]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,
    /// Load the model vocabulary before accepting requests.
    #[arg(long)]
    warm: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    info!(
        model = %config.model_name,
        problem = %config.problem_name,
        hparams = %config.hparams_name,
        usr_dir = %config.t2t_usr_dir,
        "configuring summarizer"
    );
    info!(
        server = %config.serving_host,
        servable = %config.servable_name,
        "using model server"
    );
    if config.github_token.is_none() {
        warn!("GH_TOKEN not configured; issue fetches will be unauthenticated");
    }

    let samples = Arc::new(CsvSampleIssues::new(config.sample_issues.clone()));
    match samples.preload().await {
        Ok(count) => info!(count, "sample issues ready"),
        Err(err) => warn!(error = %err, "sample issues unavailable"),
    }

    let issue_fetcher = Arc::new(GitHubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
        config.http_timeout,
    )?);

    let serving = ServingClient::new(config.predict_url(), config.http_timeout)?;
    let summarizer = Arc::new(T2tSummarizer::new(
        serving,
        VocabSource {
            problem_name: config.problem_name.clone(),
            data_dir: config.data_dir.clone(),
            vocab_file: config.vocab_file.clone(),
        },
    ));
    if cli.warm {
        summarizer.warm_init().await?;
    }

    let context = AppContext::new(config, samples, issue_fetcher, summarizer);
    let app = server::router(context);

    let listener = bind_listener(&cli.host, cli.port).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Binds the server socket, resolving host names such as `localhost`.
async fn bind_listener(host: &str, port: u16) -> AppResult<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|err| AppError::Configuration(format!("cannot bind {host}:{port}: {err}")))
}
