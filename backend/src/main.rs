// GazeLink bridge server: eye tracker control over WebSocket.

use std::env;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tracing::{error, info};

use gaze_core::config::EyeMode;
use gaze_core::keys::KeyMap;
use gaze_core::session::{DeviceSession, SessionConfig};

use gazelink_server::app::{AppState, ViewingGeometry};
use gazelink_server::bridge::{DisplayMode, RemoteDisplayBridge};
use gazelink_server::constants::{
    BROADCAST_CAP, DEFAULT_DISTANCE_FROM_SCREEN_MM, DEFAULT_MONITOR_WIDTH_MM,
    DEFAULT_RECORDING_FILE, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH,
};
use gazelink_server::driver::DummyDriver;
use gazelink_server::http;

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = env::var("HTTP_BIND").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(5001);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .expect("invalid HTTP_BIND or HTTP_PORT");

    let recording_file =
        env::var("GAZELINK_EDF_FILE").unwrap_or_else(|_| DEFAULT_RECORDING_FILE.to_string());
    let eye = env::var("GAZELINK_EYE")
        .ok()
        .and_then(|value| EyeMode::parse(&value).ok())
        .unwrap_or(EyeMode::Both);
    let screen_width = env_u32("GAZELINK_SCREEN_W", DEFAULT_SCREEN_WIDTH);
    let screen_height = env_u32("GAZELINK_SCREEN_H", DEFAULT_SCREEN_HEIGHT);
    let display_mode = env::var("GAZELINK_DISPLAY")
        .ok()
        .and_then(|value| DisplayMode::parse(&value))
        .unwrap_or(DisplayMode::Remote);
    let viewing = ViewingGeometry {
        distance_from_screen_mm: env_f64(
            "GAZELINK_SCREEN_DISTANCE_MM",
            DEFAULT_DISTANCE_FROM_SCREEN_MM,
        ),
        monitor_width_mm: env_f64("GAZELINK_MONITOR_WIDTH_MM", DEFAULT_MONITOR_WIDTH_MM),
    };

    let (tx, _) = broadcast::channel::<String>(BROADCAST_CAP);
    let start_instant = Instant::now();

    let driver_kind = env::var("GAZELINK_DRIVER").unwrap_or_else(|_| "dummy".to_string());
    if driver_kind != "dummy" {
        error!(driver_kind, "unknown GAZELINK_DRIVER");
        return;
    }
    let driver = DummyDriver::new((screen_width, screen_height));
    let sink = RemoteDisplayBridge::new(tx.clone(), display_mode);
    let config = SessionConfig::new(&recording_file, eye, (screen_width, screen_height));
    let session = match DeviceSession::configure(Box::new(driver), Box::new(sink), config) {
        Ok(session) => session,
        Err(err) => {
            error!(%err, "device session setup failed");
            return;
        }
    };
    info!(
        recording_file,
        eye = eye.as_str(),
        screen_width,
        screen_height,
        ?display_mode,
        "device session configured"
    );

    let app_state = AppState {
        tx,
        session: Arc::new(Mutex::new(session)),
        monitor_active: Arc::new(AtomicBool::new(false)),
        keys: Arc::new(KeyMap::new()),
        viewing,
        start_instant,
    };

    let app = http::router(app_state);

    info!(%addr, "starting server");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .expect("server failed");
}
