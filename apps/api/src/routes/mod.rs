pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::{handlers, ui};
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // JSON API
        .route("/analyze_resume/", post(handlers::handle_analyze_resume))
        .route("/analyze_resume/:id", get(handlers::handle_get_analysis))
        // Interactive upload
        .route("/", get(ui::handle_upload_page))
        .route("/ui/analyze", post(ui::handle_ui_analyze))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::pipeline::AnalysisPipeline;
    use crate::analysis::store::DocumentStore;
    use crate::analysis::testing::{FailingStore, MemoryStore, StubCompleter, StubExtractor};
    use crate::analysis::ui::REJECTION_MESSAGE;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";
    const SCENARIO_REPLY: &str = r#"Sure! {"personal_details":{"full_name":"John Doe","email":"john@x.com"}, "skills":["Go"], "ats_score":72, "suggestions":["Add a summary."]}"#;

    struct Harness {
        app: Router,
        extractor: Arc<StubExtractor>,
        completer: Arc<StubCompleter>,
    }

    fn harness(
        extractor: StubExtractor,
        completer: StubCompleter,
        store: Arc<dyn DocumentStore>,
    ) -> Harness {
        harness_with_limit(extractor, completer, store, 1024 * 1024)
    }

    fn harness_with_limit(
        extractor: StubExtractor,
        completer: StubCompleter,
        store: Arc<dyn DocumentStore>,
        max_upload_bytes: usize,
    ) -> Harness {
        let extractor = Arc::new(extractor);
        let completer = Arc::new(completer);
        let pipeline = AnalysisPipeline::new(extractor.clone(), completer.clone(), store);
        let state = AppState {
            pipeline: Arc::new(pipeline),
        };
        Harness {
            app: build_router(state, max_upload_bytes),
            extractor,
            completer,
        }
    }

    fn scenario() -> Harness {
        harness(
            StubExtractor::text("John Doe\nEmail: john@x.com"),
            StubCompleter::replying(SCENARIO_REPLY),
            Arc::new(MemoryStore::default()),
        )
    }

    fn upload_request(uri: &str, file_name: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n\
             %PDF-1.4 fake\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_api_returns_parsed_record() {
        let h = scenario();
        let response = h
            .app
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(handlers::ANALYSIS_ID_HEADER));
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["personal_details"]["full_name"], "John Doe");
        assert_eq!(body["ats_score"], 72);
        assert_eq!(body["suggestions"][0], "Add a summary.");
    }

    #[tokio::test]
    async fn test_api_returns_fallback_payload() {
        let h = harness(
            StubExtractor::text("resume"),
            StubCompleter::replying("I could not analyze this resume."),
            Arc::new(MemoryStore::default()),
        );
        let response = h
            .app
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"raw_response": "I could not analyze this resume."})
        );
    }

    #[tokio::test]
    async fn test_api_stored_analysis_can_be_fetched() {
        let h = scenario();
        let response = h
            .app
            .clone()
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();
        let id = response.headers()[handlers::ANALYSIS_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        let response = h
            .app
            .oneshot(
                Request::builder()
                    .uri(format!("/analyze_resume/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["id"], id);
        assert_eq!(body["resume_data"]["skills"][0], "Go");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_api_unknown_analysis_is_not_found() {
        let h = scenario();
        let response = h
            .app
            .oneshot(
                Request::builder()
                    .uri(format!("/analyze_resume/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_extraction_failure_is_bad_request() {
        let h = harness(
            StubExtractor::failing(),
            StubCompleter::replying(SCENARIO_REPLY),
            Arc::new(MemoryStore::default()),
        );
        let response = h
            .app
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_llm_failure_is_bad_gateway() {
        let h = harness(
            StubExtractor::text("resume"),
            StubCompleter::failing(),
            Arc::new(MemoryStore::default()),
        );
        let response = h
            .app
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_api_store_failure_still_returns_analysis() {
        let h = harness(
            StubExtractor::text("resume"),
            StubCompleter::replying(SCENARIO_REPLY),
            Arc::new(FailingStore),
        );
        let response = h
            .app
            .oneshot(upload_request("/analyze_resume/", "resume.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["analysis"]["ats_score"], 72);
    }

    #[tokio::test]
    async fn test_api_missing_file_field_is_bad_request() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\
             \r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/analyze_resume/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let h = scenario();
        let response = h.app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        for uri in ["/analyze_resume/", "/ui/analyze"] {
            let h = harness_with_limit(
                StubExtractor::text("resume"),
                StubCompleter::replying(SCENARIO_REPLY),
                Arc::new(MemoryStore::default()),
                16,
            );
            let response = h
                .app
                .oneshot(upload_request(uri, "resume.pdf"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE, "{uri}");
            assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_ui_renders_report() {
        let h = scenario();
        let response = h
            .app
            .oneshot(upload_request("/ui/analyze", "resume.pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let report = body_text(response).await;
        assert!(report.lines().any(|l| l == "72 / 100"));
        assert!(report.contains("- Add a summary."));
    }

    #[tokio::test]
    async fn test_ui_rejects_non_pdf_without_running_pipeline() {
        for name in ["resume.docx", "resume.PDF"] {
            let h = scenario();
            let response = h
                .app
                .oneshot(upload_request("/ui/analyze", name))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, REJECTION_MESSAGE);
            assert_eq!(h.extractor.calls.load(Ordering::SeqCst), 0);
            assert_eq!(h.completer.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_ui_fallback_shows_raw_text() {
        let h = harness(
            StubExtractor::text("resume"),
            StubCompleter::replying("I could not analyze this resume."),
            Arc::new(MemoryStore::default()),
        );
        let response = h
            .app
            .oneshot(upload_request("/ui/analyze", "resume.pdf"))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "I could not analyze this resume.");
    }

    #[tokio::test]
    async fn test_ui_store_failure_shows_report_and_warning() {
        let h = harness(
            StubExtractor::text("resume"),
            StubCompleter::replying(SCENARIO_REPLY),
            Arc::new(FailingStore),
        );
        let response = h
            .app
            .oneshot(upload_request("/ui/analyze", "resume.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_text(response).await;
        assert!(text.contains("72 / 100"));
        assert!(text.contains("⚠️ This analysis could not be saved"));
    }

    #[tokio::test]
    async fn test_upload_page_served() {
        let h = scenario();
        let response = h
            .app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("/ui/analyze"));
    }

    #[tokio::test]
    async fn test_health() {
        let h = scenario();
        let response = h
            .app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
