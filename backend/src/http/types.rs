// Response types for the HTTP endpoints.

use serde::Serialize;

use gaze_core::config::TrackingSettings;
use gaze_core::session::SessionState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct DebugSessionResponse {
    pub timestamp_ms: u64,
    pub uptime_ms: u64,
    pub state: SessionState,
    pub recording_file: String,
    pub eye: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub monitor_active: bool,
    pub ws_subscribers: usize,
    pub settings: TrackingSettings,
}
