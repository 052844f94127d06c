//! Recovers the structured record from a model reply.
//!
//! The reply is free-form text that should contain one JSON object, possibly
//! wrapped in prose or markdown fences. The slice from the first `{` to the
//! last `}` is parsed; anything unusable degrades to
//! [`AnalysisOutcome::Fallback`] carrying the reply unchanged. This never fails.

use serde_json::Value;
use tracing::warn;

use crate::models::resume::{AnalysisOutcome, ResumeRecord};

/// Greedy `{ ... }` span: first opening brace through last closing brace.
pub fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

pub fn parse_completion(raw: &str) -> AnalysisOutcome {
    match try_parse_record(raw) {
        Ok(record) => AnalysisOutcome::Structured(record),
        Err(reason) => {
            warn!("Model reply is not a usable record ({reason}); keeping raw response");
            AnalysisOutcome::fallback(raw)
        }
    }
}

fn try_parse_record(raw: &str) -> Result<ResumeRecord, String> {
    // A reply that is entirely valid JSON but not an object (array, string,
    // number) is rejected outright rather than mined for an inner object.
    if let Ok(whole) = serde_json::from_str::<Value>(raw.trim()) {
        if !whole.is_object() {
            return Err("top-level JSON is not an object".to_string());
        }
    }

    let span = brace_span(raw).ok_or_else(|| "no JSON object found".to_string())?;
    let value: Value = serde_json::from_str(span).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("JSON is not an object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}
