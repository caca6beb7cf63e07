pub mod health;
pub mod namespaces;
pub mod notifications;
pub mod services;

use crate::config::DashboardConfig;
use crate::list::poller::PollerHandle;
use crate::list::service::ServiceListController;
use crate::namespaces::NamespaceSelection;
use crate::notifications::TracingNotifier;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub services: Arc<ServiceListController>,
    pub service_poller: PollerHandle,
    pub selection: Arc<NamespaceSelection>,
    pub notifications: Arc<TracingNotifier>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/services", get(services::list_services))
        .route("/services/refresh", post(services::refresh_services))
        .route(
            "/namespaces/selection",
            get(namespaces::get_selection).put(namespaces::update_selection),
        )
        .route("/notifications", get(notifications::list_notifications))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::list::controller::tests::ScriptedFetcher;
    use crate::list::service::{self, MenuWidget};
    use crate::models::ListMeta;
    use crate::models::service::{Service, ServiceList, ServiceType};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn service(name: &str, namespace: &str, cluster_ip: &str) -> Service {
        serde_json::from_value(json!({
            "objectMeta": { "name": name, "namespace": namespace },
            "type": "ClusterIP",
            "clusterIP": cluster_ip,
            "internalEndpoint": { "host": name, "ports": [] },
        }))
        .unwrap()
    }

    /// State whose poller has applied the first scripted response.
    async fn state(responses: Vec<crate::error::Result<ServiceList>>) -> AppState {
        let notifications = Arc::new(TracingNotifier::new(10));
        let services = Arc::new(
            service::controller(
                Arc::new(ScriptedFetcher::new(responses)),
                notifications.clone(),
                Arc::new(MenuWidget::default()),
                None,
            )
            .unwrap(),
        );
        let mut rendered = services.subscribe();
        let service_poller =
            crate::list::poller::spawn(&services, Duration::from_secs(3600), || None);

        // The first poll either renders or fails straight away.
        let _ = tokio::time::timeout(Duration::from_millis(500), rendered.changed()).await;

        AppState {
            config: Arc::new(DashboardConfig::default()),
            services,
            service_poller,
            selection: Arc::new(NamespaceSelection::new(vec!["default".to_string()])),
            notifications,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn put_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(state(Vec::new()).await);
        let (status, body) = send(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_list_services_renders_rows_and_columns() {
        let list = ServiceList {
            list_meta: ListMeta { total_items: 2 },
            services: vec![
                service("web", "default", "10.0.0.1"),
                service("db", "default", ""),
            ],
            errors: Vec::new(),
        };
        let app = router(state(vec![Ok(list)]).await);

        let (status, body) = send(app, get("/services")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "rendered");
        assert_eq!(
            body["columns"],
            json!(["statusicon", "name", "labels", "clusterip", "internalendp", "externalendp", "age", "menu"])
        );
        assert_eq!(body["rows"][0]["status"]["cssClass"], "kd-success");
        assert_eq!(body["rows"][1]["status"]["cssClass"], "kd-muted");
        assert_eq!(body["rows"][1]["status"]["icon"], "timelapse");
        assert_eq!(body["rows"][0]["actions"]["menu"]["name"], "web");
        assert_eq!(body["listMeta"]["totalItems"], 2);
    }

    #[tokio::test]
    async fn test_list_services_paging() {
        let list = ServiceList {
            list_meta: ListMeta { total_items: 3 },
            services: vec![
                service("a", "default", "10.0.0.1"),
                service("b", "default", "10.0.0.2"),
                service("c", "default", "10.0.0.3"),
            ],
            errors: Vec::new(),
        };
        let app = router(state(vec![Ok(list)]).await);

        let (status, body) = send(app.clone(), get("/services?page=2&itemsPerPage=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["rows"][0]["resource"]["objectMeta"]["name"], "c");

        let (status, _) = send(app.clone(), get("/services?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, get("/services?itemsPerPage=0")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_namespace_selection_toggles_namespace_column() {
        let list = ServiceList {
            list_meta: ListMeta { total_items: 1 },
            services: vec![service("web", "shop", "10.0.0.1")],
            errors: Vec::new(),
        };
        let app = router(state(vec![Ok(list)]).await);

        let (status, body) = send(
            app.clone(),
            put_json("/namespaces/selection", json!({ "namespaces": ["default", "shop"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["multipleSelected"], true);

        let (_, body) = send(app.clone(), get("/services")).await;
        assert_eq!(body["columns"][2], "namespace");

        send(
            app.clone(),
            put_json("/namespaces/selection", json!({ "namespaces": ["shop"] })),
        )
        .await;
        let (_, body) = send(app.clone(), get("/services")).await;
        assert_eq!(body["columns"][2], "labels");

        let (status, body) = send(app, get("/namespaces/selection")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["namespaces"], json!(["shop"]));
    }

    #[tokio::test]
    async fn test_invalid_namespace_selection_is_rejected() {
        let app = router(state(Vec::new()).await);

        let (status, body) = send(
            app,
            put_json("/namespaces/selection", json!({ "namespaces": ["Not_Valid"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_notified() {
        let app = router(
            state(vec![Err(AppError::Fetch("api server unavailable".to_string()))]).await,
        );

        let (status, body) = send(app.clone(), get("/notifications")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["message"], "Fetch failed: api server unavailable");

        let (_, body) = send(app, get("/services")).await;
        assert_eq!(body["state"], "idle");
        assert_eq!(body["rows"], json!([]));
        assert_eq!(body["lastError"], "Fetch failed: api server unavailable");
    }

    #[tokio::test]
    async fn test_refresh_is_accepted() {
        let app = router(state(Vec::new()).await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/services/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_unknown_service_type_deserializes() {
        let parsed: Service = serde_json::from_value(json!({
            "objectMeta": { "name": "odd" },
            "type": "Headless",
            "internalEndpoint": { "host": "odd", "ports": [] },
        }))
        .unwrap();
        assert_eq!(parsed.service_type, ServiceType::Unknown);
    }
}
