//! The analysis pipeline: image intake → per-question VQA → narrative
//! explanation (remote with deterministic fallback).
//!
//! Everything here is synchronous and sequential: one VQA call per selected
//! question, in selection order, then a single explanation pass. Callers on
//! an async runtime bridge in via `spawn_blocking`.

pub mod backend;
pub mod fallback;
pub mod intake;
pub mod narrative;
pub mod vqa;

use thiserror::Error;

use crate::models::analysis::{Explanation, VqaResults};
use crate::models::imaging::ImageAsset;
use crate::models::patient::PatientRecord;
use crate::models::questions::QuestionSet;

use narrative::TextGenerate;
use vqa::VqaModel;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("VQA model load failed: {0}")]
    ModelLoad(String),

    #[error("Cannot decode image: {0}")]
    ImageDecode(String),

    #[error("Image exceeds {limit} byte limit ({actual} bytes)")]
    ImageTooLarge { actual: usize, limit: usize },

    #[error("File too small to be a valid image")]
    ImageTooSmall,

    #[error("Remote service returned status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("No questions selected")]
    NoQuestions,

    #[error("No image has been uploaded")]
    MissingImage,

    #[error("VQA model is not loaded")]
    ModelNotLoaded,
}

/// Run one full analysis: every selected question through the VQA model,
/// in order, then the narrative explanation with its quality gate.
///
/// Results are built fresh each run; the caller replaces any prior run's
/// output wholesale. An empty question set is rejected before any model
/// call so existing results stay untouched.
pub fn run_analysis(
    image: &ImageAsset,
    questions: &QuestionSet,
    model: &dyn VqaModel,
    generator: &dyn TextGenerate,
    patient: &PatientRecord,
) -> Result<(VqaResults, Explanation), AnalysisError> {
    let ordered = questions.ordered();
    if ordered.is_empty() {
        return Err(AnalysisError::NoQuestions);
    }

    let _span = tracing::info_span!("analysis_run", questions = ordered.len()).entered();
    let start = std::time::Instant::now();

    let mut results = VqaResults::new();
    for question in &ordered {
        let answer = model.answer(&image.bytes, question)?;
        tracing::debug!(question = %question, answer = %answer, "VQA answer");
        results.insert(question.clone(), answer);
    }

    let explanation = narrative::explain(&results, image.modality, patient, generator);

    tracing::info!(
        elapsed_ms = %start.elapsed().as_millis(),
        answers = results.len(),
        explanation_source = ?explanation.source,
        "analysis complete"
    );

    Ok((results, explanation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::ExplanationSource;
    use crate::models::enums::{AnatomicalRegion, Modality};
    use crate::models::imaging::ImageKind;

    struct EchoVqa;

    impl VqaModel for EchoVqa {
        fn answer(&self, _image: &[u8], question: &str) -> Result<String, AnalysisError> {
            Ok(format!("answer to: {question}"))
        }
    }

    struct FailingGenerator;

    impl TextGenerate for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
            Err(AnalysisError::RemoteStatus {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    fn test_image() -> ImageAsset {
        ImageAsset {
            bytes: vec![0u8; 128],
            width: 2,
            height: 2,
            kind: ImageKind::Png,
            modality: Modality::XRay,
            modality_detail: None,
            region: AnatomicalRegion::Chest,
        }
    }

    #[test]
    fn empty_question_set_is_rejected_before_any_call() {
        struct PanickingVqa;
        impl VqaModel for PanickingVqa {
            fn answer(&self, _: &[u8], _: &str) -> Result<String, AnalysisError> {
                panic!("must not be called");
            }
        }

        let err = run_analysis(
            &test_image(),
            &QuestionSet::default(),
            &PanickingVqa,
            &FailingGenerator,
            &PatientRecord::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::NoQuestions));
    }

    #[test]
    fn answers_follow_selection_order() {
        let questions = QuestionSet {
            selected: vec!["second?".into(), "first?".into()],
            custom: Some("third?".into()),
        };
        let (results, _) = run_analysis(
            &test_image(),
            &questions,
            &EchoVqa,
            &FailingGenerator,
            &PatientRecord::default(),
        )
        .unwrap();

        let keys: Vec<&str> = results.iter().map(|(q, _)| q).collect();
        assert_eq!(keys, vec!["second?", "first?", "third?"]);
        assert_eq!(results.get("first?"), Some("answer to: first?"));
    }

    #[test]
    fn remote_failure_degrades_to_fallback_not_error() {
        let questions = QuestionSet {
            selected: vec!["What might be the diagnosis based on this image?".into()],
            custom: None,
        };
        let (results, explanation) = run_analysis(
            &test_image(),
            &questions,
            &EchoVqa,
            &FailingGenerator,
            &PatientRecord::default(),
        )
        .unwrap();

        assert_eq!(explanation.source, ExplanationSource::Fallback);
        let expected = fallback::fallback_explanation(&results, &PatientRecord::default());
        assert_eq!(explanation.text, expected);
    }
}
