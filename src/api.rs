//! REST API server for the CFO helper
//!
//! Exposes the session (scenario, simulation, advisor, billing) over HTTP.
//! Every endpoint except `/health` answers with the [`ApiResponse`] envelope.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::datasource::{MockScenarioSource, ScenarioSource};
use crate::engine::compute_metrics;
use crate::error::AdvisorError;
use crate::models::{ScenarioInput, ScenarioOverrides};
use crate::session::Session;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Either a single `message` or a transcript whose last user turn is answered
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    fn question(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| {
                self.messages
                    .iter()
                    .rev()
                    .find(|m| m.role == "user")
                    .map(|m| m.content.as_str())
            })
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn bad_request(message: impl Into<String>) -> ApiResult {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message.into())))
}

fn rejected(err: AdvisorError) -> ApiResult {
    match err {
        AdvisorError::InvalidInput(_) | AdvisorError::SerializationError(_) => {
            bad_request(err.to_string())
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(other.to_string())),
        ),
    }
}

/// Parse a JSON body; an empty body yields the type's default
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiResult> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid request body: {}", e)))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<Mutex<Session>>,
    pub source: Arc<dyn ScenarioSource>,
    fallback_source: Arc<MockScenarioSource>,
}

impl ApiState {
    pub fn new(session: Session, source: Arc<dyn ScenarioSource>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            source,
            fallback_source: Arc::new(MockScenarioSource::new()),
        }
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Scenario Endpoints
/// =============================

async fn get_scenario(State(state): State<ApiState>) -> ApiResult {
    let session = state.session.lock().await;
    ok(session.input())
}

async fn update_scenario(State(state): State<ApiState>, body: Bytes) -> ApiResult {
    let overrides: ScenarioOverrides = match parse_body(&body) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    if let Err(e) = overrides.validate() {
        return rejected(e);
    }

    let mut session = state.session.lock().await;
    match session.apply_overrides(&overrides) {
        Ok(input) => {
            info!("Scenario updated");
            ok(input)
        }
        Err(e) => rejected(e),
    }
}

/// Optional overrides, then a billed simulation of the resulting scenario
async fn simulate(State(state): State<ApiState>, body: Bytes) -> ApiResult {
    let overrides: ScenarioOverrides = match parse_body(&body) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    if let Err(e) = overrides.validate() {
        return rejected(e);
    }

    let mut session = state.session.lock().await;
    if !overrides.is_empty() {
        if let Err(e) = session.apply_overrides(&overrides) {
            return rejected(e);
        }
    }

    ok(session.run_simulation())
}

/// Unbilled metrics preview for an arbitrary scenario
async fn preview_metrics(body: Bytes) -> ApiResult {
    let input: ScenarioInput = match parse_body(&body) {
        Ok(i) => i,
        Err(resp) => return resp,
    };
    if let Err(e) = input.validate() {
        return rejected(e);
    }

    ok(compute_metrics(&input))
}

/// =============================
/// Advisor Endpoint
/// =============================

async fn chat_handler(State(state): State<ApiState>, body: Bytes) -> ApiResult {
    let req: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => return bad_request(format!("Invalid request body: {}", e)),
    };
    let Some(question) = req.question() else {
        return bad_request("No user message found");
    };

    // Snapshot under the lock; the advisor may wait on a remote responder.
    let (advisor, input) = {
        let session = state.session.lock().await;
        (session.advisor().clone(), *session.input())
    };

    let reply = advisor.ask(question, &input).await;
    info!(category = %reply.category, "Advisor answered");
    ok(reply)
}

/// =============================
/// Report & Billing Endpoints
/// =============================

async fn export_report(State(state): State<ApiState>) -> ApiResult {
    let report = state.session.lock().await.export_report();
    let text = report.to_text();

    ok(serde_json::json!({
        "report": report,
        "text": text,
    }))
}

async fn share(State(state): State<ApiState>) -> ApiResult {
    let text = state.session.lock().await.share_text();
    ok(serde_json::json!({ "text": text }))
}

async fn usage(State(state): State<ApiState>) -> ApiResult {
    ok(state.session.lock().await.usage())
}

async fn live_updates(State(state): State<ApiState>) -> ApiResult {
    match state.source.live_updates().await {
        Ok(updates) => ok(serde_json::json!({ "updates": updates, "live": true })),
        Err(e) => {
            warn!("Live data fetch failed, serving mock data: {}", e);
            match state.fallback_source.live_updates().await {
                Ok(updates) => ok(serde_json::json!({ "updates": updates, "live": false })),
                Err(e) => rejected(e),
            }
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/scenario", get(get_scenario).post(update_scenario))
        .route("/api/simulate", post(simulate))
        .route("/api/metrics", post(preview_metrics))
        .route("/api/chat", post(chat_handler))
        .route("/api/report", post(export_report))
        .route("/api/share", get(share))
        .route("/api/usage", get(usage))
        .route("/api/live-updates", get(live_updates))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let session = Session::offline().with_seed(3);
        create_router(ApiState::new(session, Arc::new(MockScenarioSource::with_seed(3))))
    }

    async fn call(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = call(app(), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_get_scenario_returns_defaults() {
        let (status, json) = call(app(), "GET", "/api/scenario", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["engineers"], 4);
        assert_eq!(json["data"]["currentCash"], 600000.0);
    }

    #[tokio::test]
    async fn test_metrics_preview() {
        let body = r#"{"monthlySpending":35000,"engineers":4,"productPrice":450,"marketingSpend":18000,"currentCash":600000}"#;
        let (status, json) = call(app(), "POST", "/api/metrics", body).await;

        assert_eq!(status, StatusCode::OK);
        let revenue = json["data"]["monthlyRevenue"].as_f64().unwrap();
        assert!((revenue - 89_100.0).abs() < 1e-6);
        assert_eq!(json["data"]["totalMonthlyExpenses"], 373000.0);
        assert!(json["data"]["breakEvenMonths"].is_null());
    }

    #[tokio::test]
    async fn test_negative_values_rejected() {
        let body = r#"{"monthlySpending":-1,"engineers":4,"productPrice":450,"marketingSpend":18000,"currentCash":600000}"#;
        let (status, json) = call(app(), "POST", "/api/metrics", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("monthlySpending"));

        let (status, _) = call(app(), "POST", "/api/scenario", r#"{"currentCash":-5}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app(), "POST", "/api/simulate", r#"{"engineers":-2}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_simulate_bills_and_returns_chart() {
        let app = app();
        let (status, json) = call(app.clone(), "POST", "/api/simulate", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["chart"]["months"].as_array().unwrap().len(), 6);
        assert_eq!(json["data"]["usage"]["totalCost"], 5);

        let (_, json) = call(app, "GET", "/api/usage", "").await;
        assert_eq!(json["data"]["scenarioCount"], 1);
    }

    #[tokio::test]
    async fn test_simulate_with_overrides_updates_scenario() {
        let app = app();
        let (status, json) = call(app.clone(), "POST", "/api/simulate", r#"{"engineers":2}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["scenario"]["engineers"], 2);

        let (_, json) = call(app, "GET", "/api/scenario", "").await;
        assert_eq!(json["data"]["engineers"], 2);
    }

    #[tokio::test]
    async fn test_chat_answers_last_user_message() {
        let body = r#"{"messages":[{"role":"user","content":"hello"},{"role":"assistant","content":"hi"},{"role":"user","content":"Should I hire more engineers?"}]}"#;
        let (status, json) = call(app(), "POST", "/api/chat", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["category"], "hiring");
        assert!(json["data"]["text"].as_str().unwrap().contains("Hiring Not Recommended"));
        assert!(json["data"].get("source").is_none());
    }

    #[tokio::test]
    async fn test_chat_without_question_rejected() {
        let (status, json) = call(app(), "POST", "/api/chat", r#"{"message":"   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No user message found");
    }

    #[tokio::test]
    async fn test_report_and_share() {
        let app = app();
        let (status, json) = call(app.clone(), "POST", "/api/report", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["data"]["text"].as_str().unwrap().contains("Key Insights"));
        assert_eq!(json["data"]["report"]["insights"][0], "Critical: Less than 3 months runway");

        let (_, json) = call(app.clone(), "GET", "/api/usage", "").await;
        assert_eq!(json["data"]["exportCost"], 10);

        let (_, json) = call(app, "GET", "/api/share", "").await;
        assert!(json["data"]["text"].as_str().unwrap().starts_with("CFO Helper Scenario:"));
    }

    #[tokio::test]
    async fn test_live_updates() {
        let (status, json) = call(app(), "GET", "/api/live-updates", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["updates"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["updates"][0]["type"], "revenue");
    }
}
