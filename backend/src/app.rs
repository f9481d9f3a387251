// Application state shared across handlers and background tasks.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use gaze_core::keys::KeyMap;
use gaze_core::session::DeviceSession;

/// Physical monitor geometry used to convert visual angle to pixels.
#[derive(Clone, Copy, Debug)]
pub struct ViewingGeometry {
    pub distance_from_screen_mm: f64,
    pub monitor_width_mm: f64,
}

#[derive(Clone)]
pub struct AppState {
    pub tx: broadcast::Sender<String>,
    /// The single device session; every handler mutates it through here.
    pub session: Arc<Mutex<DeviceSession>>,
    /// Set while a real-time monitor is running; at most one per session.
    pub monitor_active: Arc<AtomicBool>,
    pub keys: Arc<KeyMap>,
    pub viewing: ViewingGeometry,
    pub start_instant: Instant,
}
