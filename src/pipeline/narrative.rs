//! Narrative explanation generator: one remote text-generation call per
//! analysis run, gated on quality, with the deterministic rule-based
//! generator as the fallback path.

use serde_json::{json, Value};

use super::fallback::fallback_explanation;
use super::AnalysisError;
use crate::config::RemoteConfig;
use crate::models::analysis::{Explanation, ExplanationSource, VqaResults};
use crate::models::enums::Modality;
use crate::models::patient::PatientRecord;
use crate::models::text_or_sentinel;

/// Minimum trimmed length for a remote response to be accepted. Shorter
/// bodies are treated as degenerate model output and discarded.
pub const MIN_REMOTE_RESPONSE_CHARS: usize = 50;

/// Seam for the remote text-generation service.
pub trait TextGenerate: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Produce the narrative explanation for one analysis run.
///
/// Issues exactly one remote call. Any failure — transport error, non-2xx
/// status, or a trimmed body under [`MIN_REMOTE_RESPONSE_CHARS`] — degrades
/// silently to the rule-based generator; the caller never sees the raw
/// remote error.
pub fn explain(
    vqa_results: &VqaResults,
    modality: Modality,
    patient: &PatientRecord,
    generator: &dyn TextGenerate,
) -> Explanation {
    let prompt = build_prompt(vqa_results, modality, patient);

    match generator.generate(&prompt) {
        Ok(text) if passes_quality_gate(&text) => Explanation {
            text: text.trim().to_string(),
            source: ExplanationSource::Remote,
        },
        Ok(text) => {
            tracing::warn!(
                chars = text.trim().chars().count(),
                "remote explanation below quality gate, using rule-based analysis"
            );
            Explanation {
                text: fallback_explanation(vqa_results, patient),
                source: ExplanationSource::Fallback,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "remote explanation failed, using rule-based analysis");
            Explanation {
                text: fallback_explanation(vqa_results, patient),
                source: ExplanationSource::Fallback,
            }
        }
    }
}

/// Quality gate: accept only bodies of at least 50 characters after
/// trimming whitespace. Evaluated once per run, no retry.
pub fn passes_quality_gate(text: &str) -> bool {
    text.trim().chars().count() >= MIN_REMOTE_RESPONSE_CHARS
}

/// Assemble the single prompt for the remote call: labeled Q/A pairs,
/// patient context with explicit placeholders, and the declared image type.
pub fn build_prompt(
    vqa_results: &VqaResults,
    modality: Modality,
    patient: &PatientRecord,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Based on AI analysis of a {} medical image, the following observations were made:\n\n",
        modality.as_str()
    ));

    for (question, answer) in vqa_results.iter() {
        prompt.push_str(&format!("Question: {question}\nAnswer: {answer}\n"));
    }

    prompt.push_str("\nPatient Information:\n");
    prompt.push_str(&format!("- Age: {}\n", patient.age_display()));
    prompt.push_str(&format!("- Gender: {}\n", patient.gender_display()));
    prompt.push_str(&format!(
        "- Clinical History: {}\n",
        text_or_sentinel(patient.clinical_history.as_deref())
    ));
    prompt.push_str(&format!(
        "- Chief Complaint: {}\n",
        text_or_sentinel(patient.chief_complaint.as_deref())
    ));
    prompt.push_str(&format!(
        "- Current Medications: {}\n",
        text_or_sentinel(patient.medications.as_deref())
    ));

    prompt.push_str(
        "\nAs a medical expert, provide a detailed explanation of these findings, \
         potential diagnoses, recommended follow-up tests, and educational information \
         about the identified conditions.",
    );

    prompt
}

/// Remote text-generation client for the hosted inference endpoint.
pub struct HfTextClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    credential: Option<String>,
}

impl HfTextClient {
    /// Build a client from remote configuration. Must be called off the
    /// async runtime (blocking reqwest).
    pub fn new(cfg: &RemoteConfig) -> Result<Self, AnalysisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/models/{}",
                cfg.api_base.trim_end_matches('/'),
                cfg.text_model
            ),
            credential: cfg.credential.clone(),
        })
    }
}

impl TextGenerate for HfTextClient {
    fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let _span = tracing::info_span!("narrative_generate", prompt_len = prompt.len()).entered();

        let mut req = self.http.post(&self.endpoint).json(&json!({ "inputs": prompt }));
        if let Some(token) = &self.credential {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;
        Ok(extract_generated_text(&value))
    }
}

/// Success parse: a JSON array whose first element carries a
/// `generated_text` string; any other shape is stringified as-is.
fn extract_generated_text(value: &Value) -> String {
    if let Some(text) = value
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item.get("generated_text"))
        .and_then(Value::as_str)
    {
        return text.to_string();
    }
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(Result<String, ()>);

    impl TextGenerate for FixedGenerator {
        fn generate(&self, _prompt: &str) -> Result<String, AnalysisError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(AnalysisError::RemoteStatus {
                    status: 503,
                    body: "Service Unavailable".into(),
                }),
            }
        }
    }

    fn sample_results() -> VqaResults {
        let mut r = VqaResults::new();
        r.insert(
            "What might be the diagnosis based on this image?",
            "cardiomegaly",
        );
        r
    }

    #[test]
    fn gate_rejects_49_chars_and_accepts_50() {
        assert!(!passes_quality_gate(&"x".repeat(49)));
        assert!(passes_quality_gate(&"x".repeat(50)));
    }

    #[test]
    fn gate_trims_whitespace_before_counting() {
        let padded = format!("   {}   \n", "x".repeat(49));
        assert!(!passes_quality_gate(&padded));
    }

    #[test]
    fn short_remote_body_falls_back() {
        let gen = FixedGenerator(Ok("too short".into()));
        let explanation = explain(
            &sample_results(),
            Modality::XRay,
            &PatientRecord::default(),
            &gen,
        );
        assert_eq!(explanation.source, ExplanationSource::Fallback);
    }

    #[test]
    fn acceptable_remote_body_is_used_verbatim() {
        let body = "The image shows an enlarged cardiac silhouette consistent with cardiomegaly.";
        let gen = FixedGenerator(Ok(body.into()));
        let explanation = explain(
            &sample_results(),
            Modality::XRay,
            &PatientRecord::default(),
            &gen,
        );
        assert_eq!(explanation.source, ExplanationSource::Remote);
        assert_eq!(explanation.text, body);
    }

    #[test]
    fn http_503_yields_exact_fallback_text() {
        let gen = FixedGenerator(Err(()));
        let results = sample_results();
        let patient = PatientRecord::default();
        let explanation = explain(&results, Modality::XRay, &patient, &gen);
        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert_eq!(explanation.text, fallback_explanation(&results, &patient));
        assert!(!explanation.text.contains("503"));
    }

    #[test]
    fn prompt_carries_qa_pairs_and_placeholders() {
        let prompt = build_prompt(&sample_results(), Modality::Mri, &PatientRecord::default());
        assert!(prompt.contains("a MRI medical image"));
        assert!(prompt.contains("Question: What might be the diagnosis based on this image?"));
        assert!(prompt.contains("Answer: cardiomegaly"));
        assert!(prompt.contains("- Age: Not provided"));
        assert!(prompt.contains("- Clinical History: Not provided"));
    }

    #[test]
    fn prompt_includes_provided_patient_fields() {
        let patient = PatientRecord {
            age: Some(64),
            chief_complaint: Some("chest pain".into()),
            ..Default::default()
        };
        let prompt = build_prompt(&sample_results(), Modality::XRay, &patient);
        assert!(prompt.contains("- Age: 64"));
        assert!(prompt.contains("- Chief Complaint: chest pain"));
    }

    #[test]
    fn generated_text_extracted_from_array_shape() {
        let value = serde_json::json!([{"generated_text": "a narrative"}]);
        assert_eq!(extract_generated_text(&value), "a narrative");
    }

    #[test]
    fn other_json_shapes_are_stringified() {
        let value = serde_json::json!({"unexpected": true});
        assert_eq!(extract_generated_text(&value), r#"{"unexpected":true}"#);
        let value = serde_json::json!("bare string");
        assert_eq!(extract_generated_text(&value), "bare string");
    }
}
