use tracing::info;

use crate::context::AppContext;
use crate::domain::issue::IssueInput;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub summary: String,
    pub body: String,
}

pub async fn summarize_issue(ctx: &AppContext, input: IssueInput) -> AppResult<SummaryOutcome> {
    let body = match input {
        IssueInput::Text(text) => text,
        IssueInput::Url(url) => {
            info!(%url, "fetching issue from URL");
            ctx.issue_fetcher.fetch_issue_body(&url).await?
        }
    };

    ctx.summarizer.warm_init().await?;
    let mut predictions = ctx
        .summarizer
        .predict(std::slice::from_ref(&body))
        .await?;
    if predictions.len() != 1 {
        return Err(AppError::Upstream(format!(
            "expected one prediction, model server returned {}",
            predictions.len()
        )));
    }
    let prediction = predictions.remove(0);
    info!(summary = %prediction.summary, score = prediction.score, "issue summarized");

    Ok(SummaryOutcome {
        summary: prediction.summary,
        body,
    })
}
