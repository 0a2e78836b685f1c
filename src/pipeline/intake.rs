//! Image intake: decode an uploaded file into a validated bitmap asset.
//!
//! JPEG and PNG are decoded; `.dcm` uploads are accepted by extension but
//! only generic bitmap decoding is attempted, so a true DICOM payload is
//! rejected as undecodable.

use image::GenericImageView;

use super::AnalysisError;
use crate::models::enums::{AnatomicalRegion, Modality};
use crate::models::imaging::{ImageAsset, ImageKind};

/// Maximum upload size before rejecting. Prevents OOM on corrupt or
/// adversarial files.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024; // 20 MB

/// Minimum valid image size in bytes (smallest valid PNG is ~67 bytes).
pub const MIN_IMAGE_BYTES: usize = 67;

/// Upload extensions the intake accepts.
const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "dcm"];

/// Whether the uploaded filename carries an accepted extension.
pub fn accepted_file_name(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Sniff the container format from magic bytes.
fn detect_kind(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.len() >= 3 && bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        Some(ImageKind::Jpeg)
    } else if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        Some(ImageKind::Png)
    } else {
        None
    }
}

/// Decode an upload into an [`ImageAsset`] carrying the declared study
/// metadata. The previous asset, if any, is replaced wholesale by the
/// caller.
pub fn decode_upload(
    bytes: Vec<u8>,
    modality: Modality,
    modality_detail: Option<String>,
    region: AnatomicalRegion,
) -> Result<ImageAsset, AnalysisError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(AnalysisError::ImageTooSmall);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AnalysisError::ImageTooLarge {
            actual: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    let kind = detect_kind(&bytes).ok_or_else(|| {
        AnalysisError::ImageDecode("unrecognized format (expected JPEG or PNG data)".into())
    })?;

    // Full decode proves the bitmap is intact and yields dimensions.
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| AnalysisError::ImageDecode(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    tracing::debug!(
        format = kind.as_str(),
        width,
        height,
        size = bytes.len(),
        "image decoded"
    );

    Ok(ImageAsset {
        bytes,
        width,
        height,
        kind,
        modality,
        modality_detail: modality_detail.filter(|d| !d.trim().is_empty()),
        region,
    })
}
