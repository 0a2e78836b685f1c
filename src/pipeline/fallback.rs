//! Deterministic rule-based explanation used when the remote narrative
//! service is unavailable or fails the quality gate. Pure function, no
//! I/O: identical inputs always produce byte-identical output.

use crate::models::analysis::VqaResults;
use crate::models::patient::PatientRecord;
use crate::models::text_or_sentinel;

const GERIATRIC_NOTE: &str = "Given the patient's advanced age, conditions such as degenerative changes and age-related cardiovascular diseases should be considered.";
const PEDIATRIC_NOTE: &str = "Given the patient's young age, congenital or developmental conditions should be considered.";

/// Generate the rule-based analysis document.
///
/// Scans the question/answer pairs for a diagnosis (last matching pair
/// wins) and for findings, adds an age note where one applies, and emits
/// a fixed-structure markdown document.
pub fn fallback_explanation(vqa_results: &VqaResults, patient: &PatientRecord) -> String {
    let mut findings: Vec<&str> = Vec::new();
    let mut diagnosis = "Unknown";

    for (question, answer) in vqa_results.iter() {
        let q = question.to_lowercase();
        if q.contains("diagnosis") {
            diagnosis = answer;
        }
        if q.contains("abnormalities") || q.contains("finding") {
            findings.push(answer);
        }
    }

    let age_note = match patient.age {
        Some(age) if age > 65 => GERIATRIC_NOTE,
        Some(age) if age < 18 => PEDIATRIC_NOTE,
        _ => "",
    };

    let primary = if findings.is_empty() {
        "No specific findings detected".to_string()
    } else {
        findings.join(", ")
    };

    let condition_heading = if diagnosis == "Unknown" {
        "Cardiac Abnormality".to_string()
    } else {
        title_case(diagnosis)
    };

    let mut doc = String::new();
    doc.push_str("## Medical Image Analysis\n\n");

    doc.push_str("### Patient Information\n");
    doc.push_str(&format!(
        "- **Patient ID:** {}\n",
        text_or_sentinel(patient.patient_id.as_deref())
    ));
    doc.push_str(&format!("- **Age:** {}\n", patient.age_display()));
    doc.push_str(&format!("- **Gender:** {}\n", patient.gender_display()));
    doc.push_str(&format!(
        "- **Clinical History:** {}\n",
        text_or_sentinel(patient.clinical_history.as_deref())
    ));
    doc.push_str(&format!(
        "- **Chief Complaint:** {}\n",
        text_or_sentinel(patient.chief_complaint.as_deref())
    ));
    doc.push_str(&format!(
        "- **Current Medications:** {}\n",
        text_or_sentinel(patient.medications.as_deref())
    ));
    doc.push('\n');

    doc.push_str("### AI-Detected Findings\n");
    doc.push_str(&format!("- Primary observation: {primary}\n"));
    doc.push_str(&format!("- Suggested diagnosis: {diagnosis}\n"));
    doc.push('\n');

    doc.push_str("### Potential Clinical Significance\n");
    if !age_note.is_empty() {
        doc.push('\n');
        doc.push_str(age_note);
        doc.push('\n');
    }
    doc.push('\n');
    doc.push_str("Based on the AI analysis, the following conditions might be considered:\n\n");
    doc.push_str(&format!("1. **{condition_heading}**\n"));
    doc.push_str("   - Common symptoms include chest pain, shortness of breath, and fatigue\n");
    doc.push_str("   - May be associated with structural or functional changes in the heart\n");
    doc.push('\n');
    // TODO: the differential list below is cardiac regardless of the declared
    // anatomical region; needs per-region tables before this is trustworthy
    // for non-cardiac studies.
    doc.push_str("2. **Differential Diagnoses to Consider:**\n");
    doc.push_str("   - Coronary artery disease\n");
    doc.push_str("   - Cardiomyopathy\n");
    doc.push_str("   - Valvular heart disease\n");
    doc.push_str("   - Congestive heart failure\n");
    doc.push_str("   - Arrhythmias\n");
    doc.push('\n');

    doc.push_str("### Recommended Follow-up\n\n");
    doc.push_str("1. **Additional Imaging:**\n");
    doc.push_str("   - Echocardiogram for detailed cardiac structure and function\n");
    doc.push_str("   - ECG/EKG for electrical activity\n");
    doc.push_str("   - Cardiac stress test to evaluate exercise capacity\n");
    doc.push('\n');
    doc.push_str("2. **Laboratory Tests:**\n");
    doc.push_str("   - Complete blood count\n");
    doc.push_str("   - Cardiac enzymes (troponin, CK-MB)\n");
    doc.push_str("   - BNP (B-type natriuretic peptide)\n");
    doc.push_str("   - Lipid profile\n");
    doc.push('\n');
    doc.push_str("3. **Specialist Consultation:**\n");
    doc.push_str("   - Cardiology referral for comprehensive evaluation\n");
    doc.push('\n');

    doc.push_str("### Important Limitations\n\n");
    doc.push_str(
        "This analysis is generated by an AI system with limited information. A proper diagnosis requires:\n",
    );
    doc.push_str("- Complete patient history\n");
    doc.push_str("- Physical examination\n");
    doc.push_str("- Multiple diagnostic tests\n");
    doc.push_str("- Clinical expertise\n");

    doc
}

/// Title-case each whitespace-separated word: first character uppercased,
/// the rest lowercased.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
