//! Session lifecycle endpoints plus the standard question catalog.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::questions::STANDARD_QUESTIONS;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// `POST /api/sessions` — start a new interaction session.
pub async fn create(State(ctx): State<ApiContext>) -> Result<Json<SessionCreated>, ApiError> {
    let session_id = ctx.store.create()?;
    Ok(Json(SessionCreated { session_id }))
}

#[derive(Serialize)]
pub struct SessionRemoved {
    pub removed: bool,
}

/// `DELETE /api/sessions/:id` — tear down a session.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionRemoved>, ApiError> {
    ctx.store.remove(id)?;
    Ok(Json(SessionRemoved { removed: true }))
}

#[derive(Serialize)]
pub struct QuestionCatalog {
    pub standard_questions: Vec<&'static str>,
}

/// `GET /api/sessions/:id/questions` — the fixed standard catalog.
pub async fn questions(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionCatalog>, ApiError> {
    if !ctx.store.exists(id) {
        return Err(ApiError::NotFound(format!("Session not found: {id}")));
    }
    Ok(Json(QuestionCatalog {
        standard_questions: STANDARD_QUESTIONS.to_vec(),
    }))
}
