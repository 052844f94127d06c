// Analysis prompt template.
// The JSON skeleton is generated from `ResumeRecord` so the requested shape and
// the parsed shape come from the same definition.

use std::sync::LazyLock;

use crate::models::resume::ResumeRecord;

pub const ANALYSIS_INSTRUCTIONS: &str = "\
You are a professional ATS (Applicant Tracking System) resume analyzer.
Extract and return ONLY JSON, no extra text.
- Always include phone, email, LinkedIn if available.
- For experience and education, provide detailed multiline descriptions (not inline).
- Provide 3–5 suggestions as full sentences.
- Calculate an ATS score between 0–100 based on relevance, clarity, and completeness.";

static SCHEMA_BLOCK: LazyLock<String> = LazyLock::new(|| {
    serde_json::to_string_pretty(&ResumeRecord::schema_skeleton())
        .unwrap_or_else(|_| "{}".to_string())
});

/// The JSON skeleton shown to the model.
pub fn schema_block() -> &'static str {
    &SCHEMA_BLOCK
}

/// Builds the full prompt for one résumé. Deterministic for a given input.
pub fn build_analysis_prompt(resume_text: &str) -> String {
    format!(
        "{ANALYSIS_INSTRUCTIONS}\n\nJSON Format:\n{}\n\nResume Text:\n{resume_text}",
        schema_block()
    )
}
