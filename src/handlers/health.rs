use super::AppState;
use axum::{extract::State, response::Json as ResponseJson};
use serde_json::{json, Value};

pub async fn health_check(State(state): State<AppState>) -> ResponseJson<Value> {
    ResponseJson(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "lists": {
            "service": state.services.state(),
        }
    }))
}
