// src/web.rs

use crate::assembler;
use crate::correction::{self, CorrectionForm};
use crate::error::ReportError;
use crate::llm_extract::{self, CompletionService};
use crate::normalizer::NormalizedReport;
use crate::output;
use crate::page::{self, PageContext};
use crate::pdf_render;
use crate::response_parser;
use axum::{
    Form, Router,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Shared by every handler; never mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionService>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(completion: Arc<dyn CompletionService>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            completion,
            static_dir: static_dir.into(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat))
        .route("/update-json", post(update_json))
        .route("/generate-pdf", post(generate_pdf))
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub user_input: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePdfForm {
    pub report_data: String,
}

async fn index() -> Html<String> {
    Html(page::render(&PageContext::default()))
}

/// POST /chat: extract a report from free text.
async fn chat(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Html<String> {
    info!(chars = form.user_input.len(), "Extraction requested");
    let extraction = llm_extract::extract_report(state.completion.as_ref(), &form.user_input).await;

    let ctx = match extraction.normalized {
        Ok(normalized) => PageContext {
            user_input: form.user_input,
            json_output: normalized.json,
            report: Some(normalized.report),
            error: extraction.upstream_error,
        },
        Err(e) => {
            warn!(error = %e, "Model output could not be normalized");
            PageContext {
                user_input: form.user_input,
                error: Some(e.to_string()),
                ..PageContext::default()
            }
        }
    };

    Html(page::render(&ctx))
}

/// POST /update-json: rebuild the report from the correction form.
async fn update_json(Form(form): Form<CorrectionForm>) -> Html<String> {
    let normalized = NormalizedReport::new(correction::build_report(&form));
    info!(bill_number = form.bill_number, "Report corrected");

    Html(page::render(&PageContext {
        user_input: String::new(),
        json_output: normalized.json,
        report: Some(normalized.report),
        error: None,
    }))
}

/// POST /generate-pdf: render a submitted report and offer it for download.
async fn generate_pdf(
    State(state): State<AppState>,
    Form(form): Form<GeneratePdfForm>,
) -> Result<Response, ReportError> {
    info!(bytes = form.report_data.len(), "PDF requested");

    let raw = response_parser::parse_response(&form.report_data)?;
    let document = assembler::assemble(&raw)?;
    let pdf = pdf_render::render_pdf(&document)?;
    let path = output::write_report(&state.static_dir, &pdf).await?;
    info!(path = %path.display(), filename = output::DOWNLOAD_FILENAME, "Serving report");

    let disposition = format!("attachment; filename=\"{}\"", output::DOWNLOAD_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
