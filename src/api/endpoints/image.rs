//! Image upload endpoint — multipart file plus declared study metadata.
//!
//! A successful upload replaces the session's image wholesale and, on the
//! first upload of the session, loads the VQA model (credentialed, with an
//! anonymous retry inside the loader). The handle is cached for the rest
//! of the session.

use std::str::FromStr;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::enums::{AnatomicalRegion, Modality};
use crate::models::imaging::ImageSummary;
use crate::pipeline::intake;

#[derive(Serialize)]
pub struct UploadResponse {
    pub image: ImageSummary,
    pub model_loaded: bool,
}

/// `POST /api/sessions/:id/image`
///
/// Multipart fields: `file` (the image), `modality`, `region`, and an
/// optional `modality_detail`.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    if !ctx.store.exists(id) {
        return Err(ApiError::NotFound(format!("Session not found: {id}")));
    }

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut modality: Option<Modality> = None;
    let mut modality_detail: Option<String> = None;
    let mut region: Option<AnatomicalRegion> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                file = Some((name, bytes.to_vec()));
            }
            Some("modality") => {
                let text = read_text(field).await?;
                modality = Some(Modality::from_str(&text)?);
            }
            Some("modality_detail") => {
                modality_detail = Some(read_text(field).await?);
            }
            Some("region") => {
                let text = read_text(field).await?;
                region = Some(AnatomicalRegion::from_str(&text)?);
            }
            _ => {} // unknown fields are ignored
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".into()))?;
    let modality =
        modality.ok_or_else(|| ApiError::BadRequest("Missing 'modality' field".into()))?;
    let region = region.ok_or_else(|| ApiError::BadRequest("Missing 'region' field".into()))?;

    if !intake::accepted_file_name(&file_name) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported file type '{file_name}': expected .jpg, .jpeg, .png or .dcm"
        )));
    }

    let needs_load = ctx.store.with_session(id, |s| s.model.is_none())?;
    let backend = ctx.backend.clone();

    // Decode and (on first upload) load the model off the async runtime.
    let (asset, handle) = tokio::task::spawn_blocking(move || {
        let asset = intake::decode_upload(bytes, modality, modality_detail, region)?;
        let handle = if needs_load {
            Some(backend.load_model()?)
        } else {
            None
        };
        Ok::<_, crate::pipeline::AnalysisError>((asset, handle))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Upload task failed: {e}")))??;

    let summary = asset.summary();
    let model_loaded = ctx.store.with_session_mut(id, |session| {
        session.image = Some(asset);
        if let Some(h) = handle {
            session.model = Some(h);
        }
        session.model.is_some()
    })?;

    tracing::info!(session_id = %id, model_loaded, "image uploaded");
    Ok(Json(UploadResponse {
        image: summary,
        model_loaded,
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))
}
