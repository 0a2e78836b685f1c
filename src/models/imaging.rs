//! In-memory image asset plus user-declared study metadata.

use serde::{Deserialize, Serialize};

use super::enums::{AnatomicalRegion, Modality};

/// Bitmap container format detected at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// The currently uploaded image. Replaced wholesale on each upload.
///
/// `bytes` holds the original encoded file; the decode at intake proves it
/// is a valid bitmap and records its dimensions. Model calls ship the
/// original bytes, base64-encoded.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
    pub modality: Modality,
    pub modality_detail: Option<String>,
    pub region: AnatomicalRegion,
}

/// Study metadata summary shown alongside a preview or in reports.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub format: &'static str,
    pub modality: Modality,
    pub modality_detail: Option<String>,
    pub region: AnatomicalRegion,
}

impl ImageAsset {
    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            width: self.width,
            height: self.height,
            format: self.kind.as_str(),
            modality: self.modality,
            modality_detail: self.modality_detail.clone(),
            region: self.region,
        }
    }
}
