//! Report composer: pure assembly of a structured [`Report`] value,
//! separate from rendering. A report is composed fresh on each export
//! request and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::analysis::{Explanation, VqaResults};
use crate::models::imaging::ImageSummary;
use crate::models::patient::PatientRecord;
use crate::models::text_or_sentinel;

pub const MARKDOWN_MIME: &str = "text/markdown";
pub const PLAIN_MIME: &str = "text/plain";

/// Export format for a composed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Plain,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Plain => "txt",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Markdown => MARKDOWN_MIME,
            Self::Plain => PLAIN_MIME,
        }
    }
}

/// Read-only composition of patient record, VQA results, explanation and
/// generation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub patient: Option<PatientRecord>,
    pub study: Option<ImageSummary>,
    pub vqa_results: VqaResults,
    pub explanation: Explanation,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn compose(
        patient: Option<&PatientRecord>,
        study: Option<&ImageSummary>,
        vqa_results: &VqaResults,
        explanation: &Explanation,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            patient: patient.cloned(),
            study: study.cloned(),
            vqa_results: vqa_results.clone(),
            explanation: explanation.clone(),
            generated_at,
        }
    }

    /// Export filename with second-precision timestamp. Calls within the
    /// same second collide; acceptable for a manual single-user export.
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "medical_report_{}.{}",
            self.generated_at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.render_markdown(),
            ReportFormat::Plain => self.render_plain(),
        }
    }

    /// Structured markup variant.
    pub fn render_markdown(&self) -> String {
        let mut doc = String::new();
        doc.push_str("# Medical Image Analysis Report\n\n");

        match &self.patient {
            Some(patient) => {
                doc.push_str("## Patient Information\n\n");
                doc.push_str(&format!(
                    "- **Patient Name:** {}\n",
                    text_or_sentinel(patient.name.as_deref())
                ));
                doc.push_str(&format!(
                    "- **Patient ID:** {}\n",
                    text_or_sentinel(patient.patient_id.as_deref())
                ));
                doc.push_str(&format!(
                    "- **Date of Birth:** {}\n",
                    PatientRecord::date_display(patient.date_of_birth)
                ));
                doc.push_str(&format!("- **Age:** {}\n", patient.age_display()));
                doc.push_str(&format!("- **Gender:** {}\n", patient.gender_display()));
                doc.push_str(&format!("- **Weight:** {}\n", metric(patient.weight_kg, "kg")));
                doc.push_str(&format!("- **Height:** {}\n", metric(patient.height_cm, "cm")));
                doc.push_str(&format!(
                    "- **Referring Physician:** {}\n",
                    text_or_sentinel(patient.referring_physician.as_deref())
                ));
                doc.push('\n');
                doc.push_str("### Clinical Information\n\n");
                doc.push_str(&format!(
                    "- **Chief Complaint:** {}\n",
                    text_or_sentinel(patient.chief_complaint.as_deref())
                ));
                doc.push_str(&format!(
                    "- **Clinical History:** {}\n",
                    text_or_sentinel(patient.clinical_history.as_deref())
                ));
                doc.push_str(&format!(
                    "- **Current Medications:** {}\n",
                    text_or_sentinel(patient.medications.as_deref())
                ));
                doc.push_str(&format!(
                    "- **Allergies:** {}\n",
                    text_or_sentinel(patient.allergies.as_deref())
                ));
                doc.push('\n');
                if let Some(study) = &self.study {
                    doc.push_str("## Study Details\n\n");
                    doc.push_str(&format!(
                        "- **Study Date:** {}\n",
                        PatientRecord::date_display(patient.study_date)
                    ));
                    push_study(&mut doc, study);
                    doc.push('\n');
                }
            }
            None => {
                doc.push_str("*No patient information provided*\n\n");
                if let Some(study) = &self.study {
                    doc.push_str("## Study Details\n\n");
                    push_study(&mut doc, study);
                    doc.push('\n');
                }
            }
        }

        doc.push_str("## AI Analysis Results\n\n");
        doc.push_str("### Visual Question Answering Results\n\n");
        for (question, answer) in self.vqa_results.iter() {
            doc.push_str(&format!("**Q: {question}**\nA: {answer}\n\n"));
        }

        doc.push_str("### AI Medical Explanation\n\n");
        doc.push_str(&self.explanation.text);
        doc.push_str("\n\n");

        doc.push_str("## Report Information\n\n");
        doc.push_str(&format!(
            "- **Generated on:** {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        doc.push_str("- **Analysis Method:** AI-assisted image analysis (VQA + LLM)\n");

        doc
    }

    /// Plain variant: identical content, headings flattened to `**`
    /// markers. Replacement order matters — `###` first, then `##`.
    pub fn render_plain(&self) -> String {
        self.render_markdown().replace("###", "**").replace("##", "**")
    }
}

fn push_study(doc: &mut String, study: &ImageSummary) {
    doc.push_str(&format!("- **Modality:** {}\n", study.modality.as_str()));
    doc.push_str(&format!(
        "- **Anatomical Region:** {}\n",
        study.region.as_str()
    ));
    doc.push_str(&format!(
        "- **Modality Details:** {}\n",
        text_or_sentinel(study.modality_detail.as_deref())
    ));
    doc.push_str(&format!(
        "- **Image Size:** {}x{} ({})\n",
        study.width, study.height, study.format
    ));
}

fn metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v} {unit}"),
        None => crate::models::NOT_PROVIDED.to_string(),
    }
}
