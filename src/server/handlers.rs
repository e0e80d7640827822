use askama::Template;
use axum::Form;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::Html;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::AppContext;
use crate::domain::issue::IssueInput;
use crate::error::{AppError, AppResult};
use crate::workflow::summary::summarize_issue;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    model_name: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SummaryForm {
    #[serde(default)]
    pub issue_text: String,
    #[serde(default)]
    pub issue_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssueBody {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub body: String,
}

pub async fn index(State(ctx): State<AppContext>) -> AppResult<Html<String>> {
    let page = IndexTemplate {
        model_name: &ctx.config.model_name,
    }
    .render()
    .map_err(|err| AppError::Render(err.to_string()))?;
    Ok(Html(page))
}

pub async fn random_github_issue(State(ctx): State<AppContext>) -> AppResult<Json<IssueBody>> {
    let body = ctx.samples.random_issue().await?;
    Ok(Json(IssueBody { body }))
}

pub async fn summary(
    State(ctx): State<AppContext>,
    form: Result<Form<SummaryForm>, FormRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(FormRejection::InvalidFormContentType(_)) => {
            info!("summary request without a form body; using empty fields");
            SummaryForm::default()
        }
        Err(rejection) => return Err(AppError::BadRequest(rejection.body_text())),
    };
    let input = IssueInput::from_form(form.issue_text, form.issue_url);
    let outcome = summarize_issue(&ctx, input).await?;
    Ok(Json(SummaryResponse {
        summary: outcome.summary,
        body: outcome.body,
    }))
}

/// Any method other than POST on `/summary` gets an empty response.
pub async fn summary_not_posted() -> StatusCode {
    info!("non-POST request to /summary");
    StatusCode::NO_CONTENT
}
