// Remote display bridge: render-sink callbacks forwarded over the channel.
// Invariants: each callback emits at most one outbound message and never
// blocks on client acknowledgment.

use tokio::sync::broadcast;
use tracing::warn;

use gaze_core::session::RenderSink;

use crate::protocol::ServerMessage;
use crate::utils::send_message;

/// Where calibration rendering goes. `Headless` keeps the warning log but
/// drops the display traffic, replacing a separate mock server variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Remote,
    Headless,
}

impl DisplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(DisplayMode::Remote),
            "headless" => Some(DisplayMode::Headless),
            _ => None,
        }
    }
}

/// Stands in for the tracker's native graphics layer: the driver calls
/// these synchronously during calibration and drift correction, and each
/// call becomes one broadcast message to the connected display clients.
pub struct RemoteDisplayBridge {
    tx: broadcast::Sender<String>,
    forward: bool,
}

impl RemoteDisplayBridge {
    pub fn new(tx: broadcast::Sender<String>, mode: DisplayMode) -> Self {
        Self {
            tx,
            forward: mode == DisplayMode::Remote,
        }
    }

    fn emit(&self, message: ServerMessage) {
        if self.forward {
            send_message(&self.tx, &message);
        }
    }
}

impl RenderSink for RemoteDisplayBridge {
    fn setup_display(&mut self) {
        self.emit(ServerMessage::SetupCalDisplay);
    }

    fn teardown_display(&mut self) {
        self.emit(ServerMessage::ExitCalDisplay);
    }

    fn clear_display(&mut self) {
        self.emit(ServerMessage::ClearCalDisplay);
    }

    fn erase_target(&mut self) {
        self.emit(ServerMessage::EraseCalTarget);
    }

    fn draw_target(&mut self, x: i32, y: i32) {
        self.emit(ServerMessage::DrawCalTarget { x, y });
    }

    fn alert(&mut self, message: &str) {
        // non-fatal device warning, surfaced but never interrupts calibration
        warn!(message, "tracker alert");
        self.emit(ServerMessage::ServerResponse {
            data: format!("tracker warning: {message}"),
        });
    }
}
