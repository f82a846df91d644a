//! HTTP API gateway for reqlens.
//!
//! Endpoints:
//!
//! - `POST /api/requirements`       — Store a requirement, returns its id
//! - `GET  /api/requirements/{id}`  — Reconstructed requirement text
//! - `POST /api/implementations`    — Check code against its requirement
//! - `GET  /api/languages`          — Accepted submission languages
//! - `GET  /api/health`             — Liveness and store backend
//!
//! Input is validated here, before the engine sees it. Engine errors are
//! mapped to status codes by kind.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use reqlens_config::{AppConfig, GatewayConfig};
use reqlens_core::error::{Error, ErrorKind, NotFoundError};
use reqlens_core::feedback::FeedbackResult;
use reqlens_core::requirement::Requirement;
use reqlens_core::submission::CodeSubmission;
use reqlens_core::validation::{validate_requirement, validate_submission};
use reqlens_engine::AlignmentEngine;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: Arc<AlignmentEngine>,
    pub config: Arc<AppConfig>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all API routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/requirements", post(create_requirement_handler))
        .route("/api/requirements/{id}", get(get_requirement_handler))
        .route("/api/implementations", post(check_implementation_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Same-origin CORS for the configured listen address.
fn cors_layer(gateway: &GatewayConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match HeaderValue::from_str(&format!("http://{}:{}", gateway.host, gateway.port)) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => cors,
    }
}

/// Start the gateway HTTP server.
pub async fn start(
    config: AppConfig,
    engine: AlignmentEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = Arc::new(GatewayState {
        engine: Arc::new(engine),
        config: Arc::new(config),
    });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

/// An engine error on its way out as an HTTP response.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<reqlens_core::error::ValidationError> for ApiError {
    fn from(err: reqlens_core::error::ValidationError) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match (&self.0, self.0.kind()) {
            (Error::NotFound(NotFoundError::Unresolvable), _) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::Upstream) => StatusCode::SERVICE_UNAVAILABLE,
            (_, ErrorKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    store: String,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        store: state.engine.repository().adapter().store().name().to_string(),
    })
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguagesResponse {
    supported_languages: Vec<String>,
}

async fn languages_handler(State(state): State<SharedState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        supported_languages: state.config.analysis.supported_languages.clone(),
    })
}

#[derive(Deserialize)]
struct CreateRequirementRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category: String,
}

#[derive(Serialize, Deserialize)]
struct CreateRequirementResponse {
    id: String,
}

async fn create_requirement_handler(
    State(state): State<SharedState>,
    Json(req): Json<CreateRequirementRequest>,
) -> Result<Json<CreateRequirementResponse>, ApiError> {
    let category = validate_requirement(&req.content, &req.category)?;
    let requirement = Requirement::with_id(req.id.unwrap_or_default(), req.content, category);

    let id = state.engine.ingest(&requirement).await?;
    Ok(Json(CreateRequirementResponse { id }))
}

async fn get_requirement_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Requirement>, ApiError> {
    Ok(Json(state.engine.requirement(&id).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckImplementationRequest {
    #[serde(default)]
    code: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    requirement_id: Option<String>,
}

async fn check_implementation_handler(
    State(state): State<SharedState>,
    Json(req): Json<CheckImplementationRequest>,
) -> Result<Json<FeedbackResult>, ApiError> {
    let analysis = &state.config.analysis;
    let language = validate_submission(
        &req.code,
        &req.language,
        analysis.max_code_size,
        &analysis.supported_languages,
    )?;

    let mut submission = CodeSubmission::new(req.code, language);
    if let Some(id) = req.requirement_id {
        submission = submission.with_requirement(id);
    }

    let outcome = state.engine.check(&submission).await?;
    info!(
        requirement_id = %outcome.requirement_id,
        tier = ?outcome.tier,
        score = outcome.feedback.alignment_score,
        "Implementation checked"
    );
    Ok(Json(outcome.feedback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use reqlens_core::error::ProviderError;
    use reqlens_core::message::Message;
    use reqlens_core::provider::{
        EmbeddingRequest, EmbeddingResponse, ModelHandle, Provider, ProviderRequest,
        ProviderResponse,
    };
    use reqlens_memory::InMemoryStore;

    /// Answers every completion with the same text.
    struct MockProvider {
        response_text: String,
    }

    impl MockProvider {
        fn new(text: &str) -> Self {
            Self {
                response_text: text.to_string(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant(&self.response_text),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    /// Word-bucket embedder: shared words give high similarity.
    struct WordEmbedder;

    fn word_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 256];
        for word in text.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = word
                .to_ascii_lowercase()
                .bytes()
                .fold(7u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64));
            v[(bucket % 256) as usize] += 1.0;
        }
        v
    }

    #[async_trait::async_trait]
    impl Provider for WordEmbedder {
        fn name(&self) -> &str {
            "word_embedder"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embedding only".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: request.inputs.iter().map(|t| word_vector(t)).collect(),
                model: request.model,
                usage: None,
            })
        }
    }

    /// Every call fails, as an unreachable endpoint would.
    struct DownProvider;

    #[async_trait::async_trait]
    impl Provider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    fn state_with(review: Arc<dyn Provider>) -> SharedState {
        let config = AppConfig::default();
        let engine = AlignmentEngine::assemble(
            &config,
            ModelHandle::new(Arc::new(WordEmbedder), "embed"),
            ModelHandle::new(Arc::new(MockProvider::new("Looks fine.")), "coder"),
            ModelHandle::new(review, "reviewer"),
            Arc::new(InMemoryStore::new()),
        );
        Arc::new(GatewayState {
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }

    fn test_state() -> SharedState {
        state_with(Arc::new(MockProvider::new(
            r#"{"alignmentScore": 8, "requirementMisses": ["no lockout"]}"#,
        )))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: HealthResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(json.status, "ok");
        assert_eq!(json.store, "in_memory");
    }

    #[tokio::test]
    async fn languages_endpoint() {
        let app = build_router(test_state());
        let req = Request::builder()
            .uri("/api/languages")
            .body(Body::empty())
            .unwrap();

        let json = body_json(app.oneshot(req).await.unwrap()).await;
        let langs = json["supportedLanguages"].as_array().unwrap();
        assert!(langs.iter().any(|l| l == "rust"));
        assert!(langs.iter().any(|l| l == "java"));
    }

    #[tokio::test]
    async fn create_then_fetch_requirement() {
        let state = test_state();

        let response = build_router(state.clone())
            .oneshot(post_json(
                "/api/requirements",
                serde_json::json!({"id": "42", "content": "Users log in with email.", "category": "Req"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], "42");

        let req = Request::builder()
            .uri("/api/requirements/42")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["content"], "Users log in with email.");
        assert_eq!(json["category"], "Req");
    }

    #[tokio::test]
    async fn requirement_without_id_gets_one() {
        let response = build_router(test_state())
            .oneshot(post_json(
                "/api/requirements",
                serde_json::json!({"content": "Reports export nightly.", "category": "Def"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(!json["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn requirement_validation_is_400() {
        let cases = [
            serde_json::json!({"content": "  ", "category": "Req"}),
            serde_json::json!({"content": "Users log in.", "category": "req"}),
            serde_json::json!({"content": "Users log in."}),
        ];
        for body in cases {
            let response = build_router(test_state())
                .oneshot(post_json("/api/requirements", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert!(body_json(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn unknown_requirement_is_404() {
        let req = Request::builder()
            .uri("/api/requirements/missing")
            .body(Body::empty())
            .unwrap();
        let response = build_router(test_state()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn implementation_checked_by_token() {
        let state = test_state();
        build_router(state.clone())
            .oneshot(post_json(
                "/api/requirements",
                serde_json::json!({"id": "42", "content": "Users log in with email.", "category": "Req"}),
            ))
            .await
            .unwrap();

        let response = build_router(state)
            .oneshot(post_json(
                "/api/implementations",
                serde_json::json!({"code": "// UC-42: login\nfn login() {}", "language": "Rust"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["alignmentScore"], 8.0);
        assert_eq!(json["requirementMisses"][0], "no lockout");
    }

    #[tokio::test]
    async fn implementation_validation_is_400() {
        let cases = [
            serde_json::json!({"code": "", "language": "rust"}),
            serde_json::json!({"code": "fn main() {}", "language": ""}),
            serde_json::json!({"code": "fn main() {}", "language": "cobol"}),
            serde_json::json!({"code": "x".repeat(50_001), "language": "rust"}),
        ];
        for body in cases {
            let response = build_router(test_state())
                .oneshot(post_json("/api/implementations", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn unresolvable_implementation_is_400() {
        let response = build_router(test_state())
            .oneshot(post_json(
                "/api/implementations",
                serde_json::json!({"code": "fn main() {}", "language": "rust"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("UC-{id}"));
    }

    #[tokio::test]
    async fn unknown_explicit_id_is_404() {
        let response = build_router(test_state())
            .oneshot(post_json(
                "/api/implementations",
                serde_json::json!({"code": "fn main() {}", "language": "rust", "requirementId": "nope"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn review_outage_is_503() {
        let state = state_with(Arc::new(DownProvider));
        build_router(state.clone())
            .oneshot(post_json(
                "/api/requirements",
                serde_json::json!({"id": "7", "content": "Users log in.", "category": "Req"}),
            ))
            .await
            .unwrap();

        let response = build_router(state)
            .oneshot(post_json(
                "/api/implementations",
                serde_json::json!({"code": "fn login() {}", "language": "rust", "requirementId": "7"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let big = "a".repeat(MAX_BODY_BYTES + 1);
        let response = build_router(test_state())
            .oneshot(post_json(
                "/api/requirements",
                serde_json::json!({"content": big, "category": "Req"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
