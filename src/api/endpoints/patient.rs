//! Patient record save endpoint. Each save validates the record and
//! replaces the session's record wholesale.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::patient::PatientRecord;

#[derive(Serialize)]
pub struct PatientSaved {
    pub saved: bool,
}

/// `PUT /api/sessions/:id/patient` — save (replace) the patient record.
pub async fn save(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(record): Json<PatientRecord>,
) -> Result<Json<PatientSaved>, ApiError> {
    record.validate()?;

    ctx.store.with_session_mut(id, |session| {
        session.patient = Some(record);
    })?;

    tracing::info!(session_id = %id, "patient record saved");
    Ok(Json(PatientSaved { saved: true }))
}
