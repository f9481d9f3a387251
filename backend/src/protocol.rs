// Wire protocol for the bidirectional display/control channel.

use serde::{Deserialize, Serialize};

/// Inbound messages from the experiment client.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "connect")]
    Connect,
    #[serde(rename = "key_event")]
    KeyEvent { keycode: String },
    #[serde(rename = "startRecording")]
    StartRecording,
    #[serde(rename = "stopRecording")]
    StopRecording,
    #[serde(rename = "calibrate")]
    Calibrate,
    #[serde(rename = "drift_correct")]
    DriftCorrect,
    #[serde(rename = "event")]
    SyncEvent {
        code: i64,
        keyword: Option<String>,
    },
    #[serde(rename = "trial_status")]
    TrialStatus { status: String },
    #[serde(rename = "realtime_eyetrack")]
    RealtimeEyetrack {
        duration: f64,
        #[serde(rename = "eyeMaxDist")]
        eye_max_dist: Option<f64>,
    },
}

/// Outbound messages to connected display clients. Calibration rendering
/// commands carry no payload except the target position.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "server_response")]
    ServerResponse { data: String },
    #[serde(rename = "setupCalDisplay")]
    SetupCalDisplay,
    #[serde(rename = "exitCalDisplay")]
    ExitCalDisplay,
    #[serde(rename = "clearCalDisplay")]
    ClearCalDisplay,
    #[serde(rename = "eraseCalTarget")]
    EraseCalTarget,
    #[serde(rename = "drawCalTarget")]
    DrawCalTarget { x: i32, y: i32 },
    /// Coordinates are relative to the screen center, in pixels.
    #[serde(rename = "eyeMovementDetected")]
    EyeMovementDetected { x: f64, y: f64 },
}
