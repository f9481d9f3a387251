// HTTP handlers and routing.

use std::sync::atomic::Ordering;

use axum::extract::State as AxumState;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app::AppState;
use crate::utils::{monotonic_ms, now_epoch_ms};
use crate::ws::ws_handler;

mod types;
use types::*;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/debug/session", get(get_debug_session))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn get_debug_session(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    Json(debug_session_snapshot(&app_state).await)
}

async fn debug_session_snapshot(app_state: &AppState) -> DebugSessionResponse {
    let (state, recording_file, eye, resolution, settings) = {
        let session = app_state.session.lock().await;
        (
            session.state(),
            session.filename().to_string(),
            session.eye().as_str().to_string(),
            session.resolution(),
            session.settings().clone(),
        )
    };
    DebugSessionResponse {
        timestamp_ms: now_epoch_ms(),
        uptime_ms: monotonic_ms(app_state.start_instant),
        state,
        recording_file,
        eye,
        screen_width: resolution.0,
        screen_height: resolution.1,
        monitor_active: app_state.monitor_active.load(Ordering::Acquire),
        ws_subscribers: app_state.tx.receiver_count(),
        settings,
    }
}
