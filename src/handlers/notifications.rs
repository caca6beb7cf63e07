use super::AppState;
use crate::notifications::Notification;
use axum::{extract::State, response::Json as ResponseJson};

pub async fn list_notifications(State(state): State<AppState>) -> ResponseJson<Vec<Notification>> {
    ResponseJson(state.notifications.recent())
}
