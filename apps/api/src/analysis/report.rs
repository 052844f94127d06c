//! Markdown report for a parsed analysis.
//!
//! Pure formatting. Absent values render as empty strings so the skeleton is
//! identical for every record.

use crate::models::resume::{AnalysisOutcome, EducationEntry, ExperienceEntry, ResumeRecord};

pub fn render_report(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Fallback(fallback) => fallback.raw_response.clone(),
        AnalysisOutcome::Structured(record) => render_record(record),
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

pub fn render_record(record: &ResumeRecord) -> String {
    let details = &record.personal_details;

    let experience = record
        .experience
        .iter()
        .map(render_experience)
        .collect::<Vec<_>>()
        .join("\n\n");
    let education = record
        .education
        .iter()
        .map(render_education)
        .collect::<Vec<_>>()
        .join("\n\n");
    let suggestions = record
        .suggestions
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## 📌 Resume Analysis\n\
         \n\
         ### 👤 Personal Details\n\
         - **Name**: {name}\n\
         - **Phone**: {phone}\n\
         - **Email**: {email}\n\
         - **LinkedIn**: {linkedin}\n\
         - **Location**: {location}\n\
         \n\
         ### 📝 Summary\n\
         {summary}\n\
         \n\
         ### 💡 Skills\n\
         {skills}\n\
         \n\
         ### 💼 Experience\n\
         {experience}\n\
         \n\
         ### 🎓 Education\n\
         {education}\n\
         \n\
         ### 📊 ATS Score\n\
         {score} / 100\n\
         \n\
         ### ✅ Suggestions\n\
         {suggestions}\n",
        name = text(&details.full_name),
        phone = text(&details.phone),
        email = text(&details.email),
        linkedin = text(&details.linkedin),
        location = text(&details.location),
        summary = text(&record.summary),
        skills = record.skills.join(", "),
        score = record.ats_score_clamped(),
    )
}

fn render_experience(entry: &ExperienceEntry) -> String {
    format!(
        "**{}** at {}\n📅 {} | 📍 {}\n{}",
        text(&entry.title),
        text(&entry.company),
        text(&entry.duration),
        text(&entry.location),
        text(&entry.details),
    )
}

fn render_education(entry: &EducationEntry) -> String {
    format!(
        "**{}** at {}\n📅 {}\n{}",
        text(&entry.degree),
        text(&entry.institution),
        text(&entry.years),
        text(&entry.details),
    )
}
