use super::AppState;
use crate::error::{AppError, Result};
use crate::list::RenderContext;
use crate::list::controller::{ListView, PageRequest};
use crate::models::ListQuery;
use crate::models::service::Service;
use crate::utils::validation;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
};
use serde_json::{json, Value};

pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<ResponseJson<ListView<Service>>> {
    let items_per_page = params.items_per_page.unwrap_or(state.config.items_per_page);
    validation::validate_items_per_page(items_per_page)?;

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::BadRequest("Pages are numbered from 1".to_string()));
    }

    // One selection snapshot per render keeps the dynamic columns consistent.
    let ctx = RenderContext::new(state.selection.snapshot());
    let view = state.services.render(
        &ctx,
        Some(PageRequest {
            page,
            items_per_page,
        }),
    );

    Ok(ResponseJson(view))
}

pub async fn refresh_services(State(state): State<AppState>) -> Result<(StatusCode, ResponseJson<Value>)> {
    if !state.service_poller.request_refresh() {
        return Err(AppError::Internal("Service list poller is not running".to_string()));
    }

    tracing::info!("Service list refresh requested");

    Ok((
        StatusCode::ACCEPTED,
        ResponseJson(json!({
            "status": "queued",
            "generation": state.services.generation(),
        })),
    ))
}
