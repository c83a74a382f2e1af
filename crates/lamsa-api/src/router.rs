//! Route definitions for the Lamsa HTTP API.
//!
//! All routes are mounted under `/api`, except the WebSocket upgrade at
//! `/ws`. The router receives `AppState` and passes it to all handlers
//! via Axum's `State` extractor.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/notifications", post(handlers::notification::dispatch))
        .route(
            "/notifications/{id}/deliveries",
            get(handlers::notification::deliveries),
        )
        .route(
            "/notifications/{id}/stats",
            get(handlers::notification::stats),
        )
        .route(
            "/recipients/{id}/preferences",
            put(handlers::recipient::update_preferences),
        )
        .route("/health", get(handlers::health::health));

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_origins;

    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let parsed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors = cors.allow_origin(parsed);
    }
    cors
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use lamsa_channels::mock::MockSender;
    use lamsa_channels::ChannelSender;
    use lamsa_core::config::{AppConfig, DatabaseConfig};
    use lamsa_database::memory::{MemoryDeliveryStore, StaticRecipientDirectory};
    use lamsa_dispatch::{NotificationDispatcher, TemplateCatalog};
    use lamsa_entity::notification::{Channel, Recipient, RecipientKind};
    use lamsa_realtime::ConnectionRegistry;

    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            server: Default::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/unused".to_owned(),
                max_connections: 1,
                min_connections: 1,
                connect_timeout_seconds: 1,
                idle_timeout_seconds: 1,
            },
            notifications: Default::default(),
            sms: Default::default(),
            push: Default::default(),
            realtime: Default::default(),
            retry: Default::default(),
            logging: Default::default(),
        }
    }

    fn test_app() -> (Router, Arc<StaticRecipientDirectory>) {
        let store = Arc::new(MemoryDeliveryStore::new());
        let directory = Arc::new(StaticRecipientDirectory::new());
        let senders: Vec<Arc<dyn ChannelSender>> =
            vec![Arc::new(MockSender::succeeding(Channel::Sms))];
        let dispatcher = Arc::new(NotificationDispatcher::new(
            senders,
            store.clone(),
            Arc::new(TemplateCatalog::builtin()),
            Default::default(),
        ));
        let state = AppState {
            config: Arc::new(test_config()),
            dispatcher,
            store,
            directory: directory.clone(),
            registry: Arc::new(ConnectionRegistry::new(5)),
        };
        (build_router(state), directory)
    }

    fn seed_recipient(directory: &StaticRecipientDirectory) -> Uuid {
        let mut recipient = Recipient::new(Uuid::new_v4(), RecipientKind::Customer);
        recipient.phone = Some("0791234567".to_owned());
        directory.insert(recipient.clone());
        recipient.id
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _) = test_app();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
    }

    #[tokio::test]
    async fn dispatch_returns_delivery_rows() {
        let (router, directory) = test_app();
        let recipient_id = seed_recipient(&directory);

        let (status, body) = post_json(
            router,
            "/api/notifications",
            json!({
                "event": "booking_confirmed",
                "recipient_id": recipient_id,
                "channels": ["sms"],
                "data": {"salon_name": "Glow", "date": "2025-06-01", "time": "15:30"},
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["success"], true);
        assert_eq!(body["data"]["deliveries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_to_unknown_recipient_is_404() {
        let (router, _) = test_app();

        let (status, body) = post_json(
            router,
            "/api/notifications",
            json!({
                "event": "booking_confirmed",
                "recipient_id": Uuid::new_v4(),
                "channels": ["sms"],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn dispatch_without_channels_is_rejected() {
        let (router, directory) = test_app();
        let recipient_id = seed_recipient(&directory);

        let (status, body) = post_json(
            router,
            "/api/notifications",
            json!({
                "event": "booking_confirmed",
                "recipient_id": recipient_id,
                "channels": [],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn preference_update_returns_no_content() {
        let (router, directory) = test_app();
        let recipient_id = seed_recipient(&directory);

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/api/recipients/{recipient_id}/preferences"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"sms": false}).to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
