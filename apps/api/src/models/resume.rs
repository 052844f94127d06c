use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// Model replies are read structurally: string fields accept any scalar or a
// list (joined with newlines), list fields accept a bare value, and keys the
// record does not name are kept in `extra` so nothing the model sent is lost.

/// Contact block at the top of a résumé.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub years: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry types that can absorb a bare string the model sent instead of an object.
trait FromFreeText {
    fn from_free_text(text: String) -> Self;
}

impl FromFreeText for ExperienceEntry {
    fn from_free_text(text: String) -> Self {
        Self {
            details: Some(text),
            ..Default::default()
        }
    }
}

impl FromFreeText for EducationEntry {
    fn from_free_text(text: String) -> Self {
        Self {
            details: Some(text),
            ..Default::default()
        }
    }
}

/// Structured analysis returned by the model.
///
/// Every field is optional on input: the model is the source of truth for the
/// shape and routinely omits sections. This struct is also the source of the
/// JSON skeleton embedded in the analysis prompt (see [`ResumeRecord::schema_skeleton`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(default, deserialize_with = "lenient_details")]
    pub personal_details: PersonalDetails,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub education: Vec<EducationEntry>,
    /// Nominally 0–100 but not bounded by the model. Use [`ResumeRecord::ats_score_clamped`]
    /// for display.
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub ats_score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub suggestions: Vec<String>,
    /// Keys the model added beyond the requested shape.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResumeRecord {
    /// Score bounded to 0–100. A missing score reads as 0.
    pub fn ats_score_clamped(&self) -> u8 {
        self.ats_score.unwrap_or(0).clamp(0, 100) as u8
    }

    /// Empty instance of every field, one entry per list of objects.
    /// Serialized, this is the JSON shape the model is asked to fill in.
    pub fn schema_skeleton() -> Self {
        let empty = || Some(String::new());
        ResumeRecord {
            personal_details: PersonalDetails {
                full_name: empty(),
                phone: empty(),
                email: empty(),
                linkedin: empty(),
                location: empty(),
                extra: Map::new(),
            },
            summary: empty(),
            skills: Vec::new(),
            experience: vec![ExperienceEntry {
                title: empty(),
                company: empty(),
                duration: empty(),
                location: empty(),
                details: empty(),
                extra: Map::new(),
            }],
            education: vec![EducationEntry {
                degree: empty(),
                institution: empty(),
                years: empty(),
                details: empty(),
                extra: Map::new(),
            }],
            ats_score: Some(0),
            suggestions: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Degraded result: the model's reply could not be read as a [`ResumeRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackPayload {
    pub raw_response: String,
}

/// What the parser produced for one completion.
///
/// Untagged on the wire: a structured outcome is the record's own JSON object,
/// a fallback is `{"raw_response": "..."}`. `Fallback` is listed first so that
/// its `deny_unknown_fields` check runs before the permissive record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Fallback(FallbackPayload),
    Structured(ResumeRecord),
}

impl AnalysisOutcome {
    pub fn fallback(raw_response: impl Into<String>) -> Self {
        AnalysisOutcome::Fallback(FallbackPayload {
            raw_response: raw_response.into(),
        })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback(_))
    }
}

/// One persisted analysis. Insert-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub resume_data: AnalysisOutcome,
    pub timestamp: DateTime<Utc>,
}

impl StoredDocument {
    /// Stamps the outcome with the current UTC time.
    pub fn new(resume_data: AnalysisOutcome) -> Self {
        Self {
            resume_data,
            timestamp: Utc::now(),
        }
    }
}

/// Text form of any JSON value. Lists are joined one item per line; `null`
/// (and an empty list) means absent.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let lines: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        object @ Value::Object(_) => Some(object.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_text))
}

/// A list of strings, or a single value standing in for a one-item list.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(value_to_text).collect(),
        Some(other) => value_to_text(other).into_iter().collect(),
    })
}

fn lenient_details<'de, D>(deserializer: D) -> Result<PersonalDetails, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_default(),
        _ => PersonalDetails::default(),
    })
}

/// A list of entry objects. A single object counts as a one-item list and a
/// bare string becomes an entry carrying it as `details`.
fn lenient_entries<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromFreeText,
{
    fn entry<T: DeserializeOwned + FromFreeText>(value: Value) -> Option<T> {
        match value {
            object @ Value::Object(_) => serde_json::from_value(object).ok(),
            other => value_to_text(other).map(T::from_free_text),
        }
    }

    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(entry::<T>).collect(),
        Some(other) => entry::<T>(other).into_iter().collect(),
    })
}

/// Integers as-is, floats rounded, numeric strings parsed. Anything else is
/// treated as an absent score instead of rejecting the whole record.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }))
}
