// LiftKey - REST API (axum)
//
// One VaultStore behind a mutex; the server is the single writer.

use crate::bridge::{shortcut_url, BridgeInbox};
use crate::card::{Card, CardType};
use crate::emulation::share_text;
use crate::error::LiftKeyError;
use crate::merge::MergeEngine;
use crate::storage::SqliteStorage;
use crate::vault::VaultStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<Mutex<VaultStore<SqliteStorage>>>,
    pub bridge: Arc<Mutex<Box<dyn BridgeInbox + Send>>>,
    pub bridge_base_url: String,
}

impl AppState {
    pub fn new(vault: VaultStore<SqliteStorage>, bridge: Box<dyn BridgeInbox + Send>, bridge_base_url: &str) -> Self {
        AppState {
            vault: Arc::new(Mutex::new(vault)),
            bridge: Arc::new(Mutex::new(bridge)),
            bridge_base_url: bridge_base_url.to_string(),
        }
    }

    fn vault(&self) -> MutexGuard<'_, VaultStore<SqliteStorage>> {
        // A panicked handler leaves the vault itself consistent
        self.vault.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bridge(&self) -> MutexGuard<'_, Box<dyn BridgeInbox + Send>> {
        self.bridge.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

fn status_for(error: &LiftKeyError) -> StatusCode {
    match error {
        LiftKeyError::EmptyIdentifier | LiftKeyError::EmptySelection => StatusCode::BAD_REQUEST,
        LiftKeyError::CardNotFound(_) => StatusCode::NOT_FOUND,
        LiftKeyError::Storage(_) | LiftKeyError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for LiftKeyError {
    fn into_response(self) -> Response {
        error_response(status_for(&self), self.to_string())
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCardRequest {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub name: String,
    /// Free text, parsed like the form field ("1, 3, 5")
    #[serde(default)]
    pub floors: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub card_ids: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BridgeQuery {
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
struct BridgeResponse {
    uid: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/cards
async fn list_cards(State(state): State<AppState>) -> Response {
    let cards: Vec<Card> = state.vault().cards().to_vec();
    ApiResponse::ok(cards)
}

/// POST /api/cards - manual acquisition
async fn create_card(State(state): State<AppState>, Json(req): Json<NewCardRequest>) -> Response {
    match Card::from_form(&req.name, &req.serial_number, &req.floors, CardType::New) {
        Ok(card) => {
            let card = state.vault().add(card).clone();
            (StatusCode::CREATED, Json(ApiResponse {
                success: true,
                data: Some(card),
                error: None,
            }))
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/cards/:id
async fn delete_card(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.vault().remove(&id) {
        Some(card) => ApiResponse::ok(card),
        None => LiftKeyError::CardNotFound(id).into_response(),
    }
}

/// GET /api/cards/:id/share - plain-text export
async fn share_card(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.vault().get(&id) {
        Some(card) => ApiResponse::ok(share_text(card)),
        None => LiftKeyError::CardNotFound(id).into_response(),
    }
}

/// POST /api/merge
async fn merge_cards(State(state): State<AppState>, Json(req): Json<MergeRequest>) -> Response {
    let mut vault = state.vault();

    if let Some(missing) = req.card_ids.iter().find(|id| vault.get(id).is_none()) {
        return LiftKeyError::CardNotFound(missing.clone()).into_response();
    }

    vault.clear_selection();
    for id in &req.card_ids {
        if !vault.is_selected(id) {
            vault.toggle_selection(id);
        }
    }

    match vault.merge_selected(&MergeEngine::new(), req.name.as_deref()) {
        Ok(card) => (StatusCode::CREATED, Json(ApiResponse {
            success: true,
            data: Some(card),
            error: None,
        }))
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /bridge?uid=... - called by the platform automation
async fn bridge_deliver(State(state): State<AppState>, Query(query): Query<BridgeQuery>) -> Response {
    let uid = query
        .uid
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());

    match uid {
        Some(uid) => {
            tracing::info!(uid = %uid, "bridge delivery");
            state.bridge().deliver(&uid);
            ApiResponse::ok(BridgeResponse { uid: Some(uid) })
        }
        None => LiftKeyError::EmptyIdentifier.into_response(),
    }
}

/// POST /api/bridge/take - consume the pending bridged identifier
async fn bridge_take(State(state): State<AppState>) -> Response {
    let uid = state.bridge().take();
    ApiResponse::ok(BridgeResponse { uid })
}

/// GET /api/bridge/shortcut
async fn bridge_shortcut(State(state): State<AppState>) -> Response {
    ApiResponse::ok(shortcut_url(&state.bridge_base_url))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/:id", delete(delete_card))
        .route("/cards/:id/share", get(share_card))
        .route("/merge", post(merge_cards))
        .route("/bridge/take", post(bridge_take))
        .route("/bridge/shortcut", get(bridge_shortcut));

    Router::new()
        .route("/bridge", get(bridge_deliver))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::PendingBridge;
    use crate::config::DEFAULT_STORAGE_KEY;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let storage = SqliteStorage::open_in_memory(DEFAULT_STORAGE_KEY).unwrap();
        let state = AppState::new(
            VaultStore::open(storage),
            Box::new(PendingBridge::new()),
            "https://liftkey.vercel.app/",
        );
        create_router(state)
    }

    async fn send(router: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(router: &Router, serial: &str, floors: &str) -> Value {
        let (status, body) = send(
            router,
            "POST",
            "/api/cards",
            Some(json!({"serialNumber": serial, "name": serial, "floors": floors})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn create_and_list_cards() {
        let router = test_router();
        let card = create(&router, "04:A1", "1, 3, 5").await;
        assert_eq!(card["floors"], json!([1, 3, 5]));
        assert_eq!(card["type"], "new");

        let (_, body) = send(&router, "GET", "/api/cards", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_identifier_is_rejected() {
        let router = test_router();
        let (status, body) = send(&router, "POST", "/api/cards", Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = send(&router, "GET", "/api/cards", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_card_and_unknown_id() {
        let router = test_router();
        let card = create(&router, "04:A1", "2").await;
        let id = card["id"].as_str().unwrap();

        let (status, _) = send(&router, "DELETE", &format!("/api/cards/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, "DELETE", &format!("/api/cards/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn merge_endpoint_unions_floors() {
        let router = test_router();
        let a = create(&router, "04:A1", "1, 2").await;
        let b = create(&router, "04:B2", "2, 3").await;

        let (status, body) = send(
            &router,
            "POST",
            "/api/merge",
            Some(json!({"cardIds": [a["id"], b["id"]], "name": "Both"})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["floors"], json!([1, 2, 3]));
        assert_eq!(body["data"]["type"], "merged");
        assert!(body["data"]["serialNumber"].as_str().unwrap().starts_with("MK-"));

        let (_, body) = send(&router, "GET", "/api/cards", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn merge_with_unknown_or_no_cards() {
        let router = test_router();
        let (status, _) = send(&router, "POST", "/api/merge", Some(json!({"cardIds": ["ghost"]}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, "POST", "/api/merge", Some(json!({"cardIds": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn share_endpoint_returns_text() {
        let router = test_router();
        let card = create(&router, "04:A1", "4").await;
        let id = card["id"].as_str().unwrap();

        let (status, body) = send(&router, "GET", &format!("/api/cards/{}/share", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "04:A1\nUID: 04:A1\nFloors: 4");
    }

    #[tokio::test]
    async fn bridge_delivery_is_consumed_once() {
        let router = test_router();
        let (status, _) = send(&router, "GET", "/bridge?uid=04%3AC3", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&router, "POST", "/api/bridge/take", None).await;
        assert_eq!(body["data"]["uid"], "04:C3");

        let (_, body) = send(&router, "POST", "/api/bridge/take", None).await;
        assert!(body["data"]["uid"].is_null());

        let (status, _) = send(&router, "GET", "/bridge", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn shortcut_url_endpoint() {
        let router = test_router();
        let (_, body) = send(&router, "GET", "/api/bridge/shortcut", None).await;
        assert_eq!(body["data"], "https://liftkey.vercel.app/?uid=");
    }
}
