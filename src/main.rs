use k8s_service_list::config::DashboardConfig;
use k8s_service_list::error::{AppError, Result};
use k8s_service_list::handlers::{self, AppState};
use k8s_service_list::list;
use k8s_service_list::list::service::MenuWidget;
use k8s_service_list::models::FetchParams;
use k8s_service_list::namespaces::NamespaceSelection;
use k8s_service_list::notifications::TracingNotifier;
use k8s_service_list::resources::service::KubeServiceFetcher;
use kube::Client;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(DashboardConfig::load()?);

    let client = Client::try_default()
        .await
        .map_err(|e| AppError::Config(format!("Failed to create Kubernetes client: {}", e)))?;

    let notifications = Arc::new(TracingNotifier::new(config.notification_history));
    let selection = Arc::new(NamespaceSelection::new(config.namespaces.clone()));

    let services = Arc::new(
        list::service::controller(
            Arc::new(KubeServiceFetcher::new(client)),
            notifications.clone(),
            Arc::new(MenuWidget::default()),
            config.fetch_limit,
        )?
        .with_query_append(config.field_selector.clone()),
    );

    let service_poller = {
        let selection = selection.clone();
        let label_selector = config.label_selector.clone();
        list::poller::spawn(&services, config.poll_interval(), move || {
            Some(FetchParams {
                namespaces: selection.snapshot().0,
                label_selector: label_selector.clone(),
            })
        })
    };

    let app = handlers::router(AppState {
        config: config.clone(),
        services: services.clone(),
        service_poller,
        selection,
        notifications,
    });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;

    tracing::info!("Service list dashboard listening on {}", listener.local_addr()?);
    tracing::info!("API endpoints:");
    tracing::info!("  Health: GET /health");
    tracing::info!("  Services: GET /services, POST /services/refresh");
    tracing::info!("  Namespaces: GET|PUT /namespaces/selection");
    tracing::info!("  Notifications: GET /notifications");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.destroy();
    tracing::info!("Service list dashboard stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}
