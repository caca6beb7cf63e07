use super::AppState;
use crate::error::Result;
use crate::utils::validation;
use axum::{
    extract::{Json, State},
    response::Json as ResponseJson,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub namespaces: Vec<String>,
}

pub async fn get_selection(State(state): State<AppState>) -> ResponseJson<Value> {
    ResponseJson(selection_body(&state))
}

pub async fn update_selection(
    State(state): State<AppState>,
    Json(payload): Json<SelectionRequest>,
) -> Result<ResponseJson<Value>> {
    validation::validate_namespace_selection(&payload.namespaces)?;

    tracing::info!(namespaces = ?payload.namespaces, "Namespace selection updated");
    state.selection.select(payload.namespaces);

    // Lists fetch per selected namespace, so pick up the new scope right away.
    state.service_poller.request_refresh();

    Ok(ResponseJson(selection_body(&state)))
}

fn selection_body(state: &AppState) -> Value {
    let selected = state.selection.snapshot();
    json!({
        "namespaces": selected.as_slice(),
        "multipleSelected": selected.are_multiple_namespaces_selected(),
    })
}
