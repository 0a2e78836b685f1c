//! Analysis endpoint: runs the selected questions through the VQA model
//! and produces the narrative explanation.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::analysis::Explanation;
use crate::models::questions::QuestionSet;
use crate::pipeline::{run_analysis, AnalysisError};

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub custom_question: Option<String>,
    /// One-click basic diagnosis: overrides the selection with exactly
    /// the standard diagnosis question.
    #[serde(default)]
    pub quick: bool,
}

#[derive(Serialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub results: Vec<QaPair>,
    pub explanation: Explanation,
}

/// `POST /api/sessions/:id/analyze`
///
/// Rejects an empty selection up front, leaving any prior run's results
/// untouched. Otherwise replaces the session's results and explanation
/// with this run's output.
pub async fn run(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let questions = if req.quick {
        QuestionSet::quick()
    } else {
        QuestionSet {
            selected: req.questions,
            custom: req.custom_question,
        }
    };

    // Checked before touching the session so existing results survive.
    if questions.is_empty() {
        return Err(AnalysisError::NoQuestions.into());
    }

    let (image, model, patient) = ctx.store.with_session(id, |session| {
        (
            session.image.clone(),
            session.model.clone(),
            session.patient.clone().unwrap_or_default(),
        )
    })?;

    let image = image.ok_or(AnalysisError::MissingImage).map_err(ApiError::from)?;
    let model = model.ok_or(AnalysisError::ModelNotLoaded).map_err(ApiError::from)?;
    let backend = ctx.backend.clone();

    let (results, explanation) = tokio::task::spawn_blocking(move || {
        let generator = backend.text_generator()?;
        run_analysis(&image, &questions, model.as_ref(), generator.as_ref(), &patient)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))??;

    ctx.store.with_session_mut(id, |session| {
        session.results = Some(results.clone());
        session.explanation = Some(explanation.clone());
    })?;

    let pairs = results
        .iter()
        .map(|(q, a)| QaPair {
            question: q.to_string(),
            answer: a.to_string(),
        })
        .collect();

    Ok(Json(AnalyzeResponse {
        results: pairs,
        explanation,
    }))
}
