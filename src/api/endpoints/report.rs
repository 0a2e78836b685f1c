//! Report export endpoint. Reports are regenerated on each request; the
//! filename carries the generation timestamp to second precision.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::report::{Report, ReportFormat};

#[derive(Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub format: Option<String>,
}

/// `GET /api/sessions/:id/report?format=markdown|plain`
pub async fn export(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let format = match params.format.as_deref() {
        None | Some("markdown") => ReportFormat::Markdown,
        Some("plain") => ReportFormat::Plain,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown report format '{other}': expected 'markdown' or 'plain'"
            )))
        }
    };

    let (patient, study, results, explanation) = ctx.store.with_session(id, |session| {
        (
            session.patient.clone(),
            session.image.as_ref().map(|i| i.summary()),
            session.results.clone(),
            session.explanation.clone(),
        )
    })?;

    let (results, explanation) = match (results, explanation) {
        (Some(r), Some(e)) => (r, e),
        _ => {
            return Err(ApiError::Conflict(
                "Run an analysis before exporting a report.".into(),
            ))
        }
    };

    let report = Report::compose(
        patient.as_ref(),
        study.as_ref(),
        &results,
        &explanation,
        Utc::now(),
    );
    let body = report.render(format);
    let file_name = report.file_name(format);

    tracing::info!(session_id = %id, file = %file_name, "report exported");

    Ok((
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
