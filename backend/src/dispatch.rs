// Inbound message dispatch: validates preconditions and routes to the
// device session or the gaze monitor.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::{debug, info, warn};

use gaze_core::geometry::deg2pix;

use crate::app::AppState;
use crate::constants::{
    DEFAULT_EYE_MAX_DIST_DEG, MONITOR_TICK_MS, STATUS_MESSAGE_MAX_LEN, SYNC_KEYWORD,
};
use crate::monitor::{run_monitor, MonitorParams};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::utils::send_message;

pub async fn handle_client_message(state: &AppState, message: ClientMessage) {
    match message {
        ClientMessage::Connect => {
            info!("client connect acknowledged");
            respond(state, "Connected");
        }
        ClientMessage::KeyEvent { keycode } => {
            let code = state.keys.resolve(&keycode);
            debug!(keycode, code, "key event");
            let mut session = state.session.lock().await;
            if let Err(err) = session.send_key(code) {
                warn!(%err, "key event dropped");
            }
        }
        ClientMessage::StartRecording => {
            let mut session = state.session.lock().await;
            if let Err(err) = session.start_recording() {
                warn!(%err, "start recording failed");
                respond(state, format!("startRecording failed: {err}"));
            }
        }
        ClientMessage::StopRecording => {
            let mut session = state.session.lock().await;
            if let Err(err) = session.stop_recording() {
                warn!(%err, "stop recording failed");
                respond(state, format!("stopRecording failed: {err}"));
            }
        }
        ClientMessage::Calibrate => {
            info!("starting calibration");
            let mut session = state.session.lock().await;
            if let Err(err) = session.calibrate() {
                warn!(%err, "calibration rejected");
                respond(state, format!("calibrate failed: {err}"));
            }
        }
        ClientMessage::DriftCorrect => {
            info!("starting drift correction");
            let mut session = state.session.lock().await;
            if let Err(err) = session.drift_correct() {
                warn!(%err, "drift correction rejected");
                respond(state, format!("drift_correct failed: {err}"));
            }
        }
        ClientMessage::SyncEvent { code, keyword } => {
            let keyword = keyword.unwrap_or_else(|| SYNC_KEYWORD.to_string());
            let marker = format!("{keyword} {code}");
            debug!(marker, "sync event");
            let mut session = state.session.lock().await;
            if let Err(err) = session.send_marker(&marker) {
                warn!(%err, "sync marker dropped");
            }
        }
        ClientMessage::TrialStatus { status } => {
            let status = if status.chars().count() > STATUS_MESSAGE_MAX_LEN {
                warn!("trial status message too long, truncating");
                status.chars().take(STATUS_MESSAGE_MAX_LEN).collect()
            } else {
                status
            };
            let mut session = state.session.lock().await;
            if let Err(err) = session.set_status_message(&status) {
                warn!(%err, "trial status dropped");
            }
        }
        ClientMessage::RealtimeEyetrack {
            duration,
            eye_max_dist,
        } => {
            start_realtime_monitor(state, duration, eye_max_dist).await;
        }
    }
}

fn respond(state: &AppState, data: impl Into<String>) {
    send_message(
        &state.tx,
        &ServerMessage::ServerResponse { data: data.into() },
    );
}

/// Spawns the bounded-duration gaze monitor. At most one may run per
/// session; a request arriving while one is active is rejected, not queued.
async fn start_realtime_monitor(state: &AppState, duration: f64, eye_max_dist: Option<f64>) {
    // rejects NaN, infinite, negative, and Duration-overflowing values
    let duration = match Duration::try_from_secs_f64(duration) {
        Ok(duration) => duration,
        Err(_) => {
            warn!(duration, "realtime_eyetrack rejected: invalid duration");
            respond(state, "realtime_eyetrack rejected: invalid duration");
            return;
        }
    };

    if state
        .monitor_active
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        warn!("realtime_eyetrack rejected: monitor already active");
        respond(state, "realtime_eyetrack rejected: already active");
        return;
    }

    let eye_max_dist_deg = eye_max_dist.unwrap_or(DEFAULT_EYE_MAX_DIST_DEG);
    let (threshold_px, center) = {
        let session = state.session.lock().await;
        let threshold = deg2pix(
            eye_max_dist_deg,
            state.viewing.distance_from_screen_mm,
            state.viewing.monitor_width_mm,
            session.resolution().0,
        );
        (threshold, session.center())
    };
    if threshold_px <= 0 {
        state.monitor_active.store(false, Ordering::Release);
        warn!(
            eye_max_dist_deg,
            "realtime_eyetrack rejected: threshold must be positive"
        );
        respond(state, "realtime_eyetrack rejected: threshold must be positive");
        return;
    }

    info!(
        ?duration,
        eye_max_dist_deg, threshold_px, "starting real-time eyetracking"
    );
    let params = MonitorParams {
        duration,
        tick: Duration::from_millis(MONITOR_TICK_MS),
        threshold_px: threshold_px as f64,
        center,
    };
    let session = state.session.clone();
    let tx = state.tx.clone();
    let monitor_active = state.monitor_active.clone();
    tokio::spawn(async move {
        let outcome = run_monitor(session, tx, params).await;
        monitor_active.store(false, Ordering::Release);
        info!(?outcome, "real-time eyetracking finished");
    });
}
