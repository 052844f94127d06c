//! Interactive upload page. Returns the Markdown report instead of JSON.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::info;

use crate::analysis::handlers::read_upload;
use crate::analysis::pipeline::PipelineError;
use crate::analysis::report::render_report;
use crate::errors::AppError;
use crate::state::AppState;

pub const REJECTION_MESSAGE: &str = "❌ Please upload a PDF file only.";

const UPLOAD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Resume Analyzer</title>
</head>
<body>
  <h2>📄 Resume Analyzer</h2>
  <p>Upload your PDF resume to get ATS analysis &amp; suggestions</p>
  <form id="upload">
    <input type="file" name="file" accept=".pdf">
    <button type="submit">Analyze</button>
  </form>
  <pre id="result"></pre>
  <script>
    document.getElementById("upload").addEventListener("submit", async (event) => {
      event.preventDefault();
      const result = document.getElementById("result");
      result.textContent = "Analyzing...";
      const response = await fetch("/ui/analyze", { method: "POST", body: new FormData(event.target) });
      result.textContent = await response.text();
    });
  </script>
</body>
</html>
"#;

/// Case-sensitive: `resume.PDF` is rejected.
pub fn is_pdf_name(file_name: &str) -> bool {
    file_name.ends_with(".pdf")
}

fn markdown(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        body,
    )
        .into_response()
}

/// GET /
pub async fn handle_upload_page() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}

/// POST /ui/analyze
pub async fn handle_ui_analyze(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) if is_pdf_name(&upload.file_name) => upload,
        Ok(_) => return markdown(StatusCode::OK, REJECTION_MESSAGE.to_string()),
        Err(e @ AppError::PayloadTooLarge(_)) => {
            return markdown(StatusCode::PAYLOAD_TOO_LARGE, format!("⚠️ {e}"))
        }
        Err(e) => return markdown(StatusCode::BAD_REQUEST, format!("⚠️ {e}")),
    };
    info!("UI analysis of '{}'", upload.file_name);

    match state.pipeline.run(upload.data).await {
        Ok(result) => markdown(StatusCode::OK, render_report(&result.outcome)),
        Err(PipelineError::Persistence { source, outcome }) => markdown(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "{}\n\n⚠️ This analysis could not be saved: {source}",
                render_report(&outcome)
            ),
        ),
        Err(e @ PipelineError::Extraction(_)) => markdown(
            StatusCode::BAD_REQUEST,
            format!("⚠️ Could not read the PDF: {e}"),
        ),
        Err(e @ PipelineError::AnalysisRequest(_)) => markdown(
            StatusCode::BAD_GATEWAY,
            format!("⚠️ Analysis failed: {e}"),
        ),
    }
}
