//! HTTP surface for document analysis.
//!
//! One upload endpoint (`POST /analyze`) plus liveness probes. The server
//! only handles transport concerns; all analysis happens in
//! [`AnalysisService`].

mod analyze;
mod routes;

pub use analyze::resolve_content_type;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::AnalysisService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(AnalysisService::from_settings(settings)?),
            max_upload_bytes: settings.server.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    if !state.service.ai_configured() {
        tracing::warn!("No Gemini API key configured; responses will not include AI insights");
    }
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::ocr::{OcrBackend, OcrError, PdfParseError, PdfParser, TextExtractor};

    const BOUNDARY: &str = "docsight-test-boundary";

    struct FailingPdf;

    #[async_trait]
    impl PdfParser for FailingPdf {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn parse(&self, _pdf: &[u8]) -> Result<String, PdfParseError> {
            Err(PdfParseError::InvalidPdf("Syntax Error: Couldn't find trailer dictionary".to_string()))
        }
    }

    struct EchoOcr;

    #[async_trait]
    impl OcrBackend for EchoOcr {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn recognize(&self, _: &[u8], content_type: &str, _: &str) -> Result<String, OcrError> {
            Ok(format!("scanned {}", content_type))
        }
    }

    fn setup_test_app(max_upload_bytes: usize) -> axum::Router {
        let extractor = TextExtractor::new(Arc::new(FailingPdf), Arc::new(EchoOcr));
        let state = AppState {
            service: Arc::new(AnalysisService::new(extractor, None)),
            max_upload_bytes,
        };
        create_router(state)
    }

    fn multipart_request(
        field: &str,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = setup_test_app(1024)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Server is running");
    }

    #[tokio::test]
    async fn test_health() {
        let response = setup_test_app(1024)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["aiConfigured"], false);
    }

    #[tokio::test]
    async fn test_analyze_plain_text() {
        let response = setup_test_app(1024)
            .oneshot(multipart_request(
                "file",
                "post.txt",
                Some("text/plain"),
                b"Big news #launch https://example.com",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["text"], "Big news #launch https://example.com");
        assert_eq!(json["extractor"], "plaintext");
        assert_eq!(json["analysis"]["wordCount"], 4);
        assert_eq!(json["analysis"]["hashtagCount"], 1);
        assert_eq!(json["analysis"]["linkCount"], 1);
        assert!(json["ai"].is_null());
        assert!(json["aiRaw"].is_null());
        assert!(json["aiModel"].is_null());
        assert_eq!(json["aiStatus"], "no_key");
    }

    #[tokio::test]
    async fn test_analyze_guesses_type_from_filename() {
        let response = setup_test_app(1024)
            .oneshot(multipart_request("file", "scan.png", None, b"not really a png"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["extractor"], "ocr");
        assert_eq!(json["text"], "scanned image/png");
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let response = setup_test_app(1024)
            .oneshot(multipart_request("upload", "post.txt", Some("text/plain"), b"hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "No file uploaded. Use field name \"file\".");
    }

    #[tokio::test]
    async fn test_empty_file() {
        let response = setup_test_app(1024)
            .oneshot(multipart_request("file", "empty.txt", Some("text/plain"), b""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn test_oversized_file() {
        let response = setup_test_app(16)
            .oneshot(multipart_request(
                "file",
                "big.txt",
                Some("text/plain"),
                &[b'a'; 100],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("16 bytes"));
    }

    #[tokio::test]
    async fn test_not_multipart() {
        let response = setup_test_app(1024)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_500() {
        let response = setup_test_app(1024)
            .oneshot(multipart_request(
                "file",
                "broken.pdf",
                Some("application/pdf"),
                b"%PDF-garbage",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("PDF extraction failed"));
    }
}
