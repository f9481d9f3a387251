// Test helpers: a scripted tracker driver and pre-wired app state.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use gaze_core::config::EyeMode;
use gaze_core::keys::KeyMap;
use gaze_core::sample::GazeSample;
use gaze_core::session::{
    DeviceSession, DriverError, NullRenderSink, RenderSink, SessionConfig, TrackerDriver,
};

use crate::app::{AppState, ViewingGeometry};
use crate::constants::BROADCAST_CAP;

/// Driver that replays a scripted sample sequence and records every
/// forwarded operation as a readable string.
#[derive(Default)]
pub struct ScriptedDriver {
    pub ops: Arc<StdMutex<Vec<String>>>,
    pub samples: Arc<StdMutex<VecDeque<Option<GazeSample>>>>,
    pub polls: Arc<StdMutex<usize>>,
}

impl ScriptedDriver {
    pub fn push_samples(&self, samples: Vec<Option<GazeSample>>) {
        self.samples.lock().unwrap().extend(samples);
    }

    fn log(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

impl TrackerDriver for ScriptedDriver {
    fn open_data_file(&mut self, filename: &str) -> Result<(), DriverError> {
        self.log(format!("open {filename}"));
        Ok(())
    }

    fn set_offline_mode(&mut self) {
        self.log("offline".to_string());
    }

    fn flush_key_queue(&mut self) {
        self.log("flush".to_string());
    }

    fn send_message(&mut self, text: &str) {
        self.log(format!("message {text}"));
    }

    fn send_command(&mut self, text: &str) {
        self.log(format!("command {text}"));
    }

    fn start_recording(&mut self) -> Result<(), DriverError> {
        self.log("start_recording".to_string());
        Ok(())
    }

    fn stop_recording(&mut self) {
        self.log("stop_recording".to_string());
    }

    fn do_tracker_setup(&mut self, sink: &mut dyn RenderSink) {
        self.log("tracker_setup".to_string());
        sink.setup_display();
        sink.draw_target(960, 540);
        sink.erase_target();
        sink.teardown_display();
    }

    fn do_drift_correct(
        &mut self,
        x: i32,
        y: i32,
        sink: &mut dyn RenderSink,
    ) -> Result<(), DriverError> {
        self.log(format!("drift_correct {x} {y}"));
        sink.draw_target(x, y);
        sink.erase_target();
        Ok(())
    }

    fn apply_drift_correct(&mut self) {
        self.log("apply_drift_correct".to_string());
    }

    fn send_keybutton(&mut self, code: u16, modifiers: u16) {
        self.log(format!("key {code} {modifiers}"));
    }

    fn newest_sample(&mut self) -> Option<GazeSample> {
        *self.polls.lock().unwrap() += 1;
        self.samples.lock().unwrap().pop_front().flatten()
    }

    fn close(&mut self) {
        self.log("close".to_string());
    }
}

pub fn scripted_session(
    driver: ScriptedDriver,
) -> (
    Arc<Mutex<DeviceSession>>,
    broadcast::Sender<String>,
    broadcast::Receiver<String>,
) {
    let (tx, rx) = broadcast::channel(BROADCAST_CAP);
    let session = DeviceSession::configure(
        Box::new(driver),
        Box::new(NullRenderSink),
        SessionConfig::new("ok.edf", EyeMode::Both, (1920, 1080)),
    )
    .expect("configure scripted session");
    (Arc::new(Mutex::new(session)), tx, rx)
}

pub fn scripted_state(driver: ScriptedDriver) -> (AppState, broadcast::Receiver<String>) {
    let (session, tx, rx) = scripted_session(driver);
    let state = AppState {
        tx,
        session,
        monitor_active: Arc::new(AtomicBool::new(false)),
        keys: Arc::new(KeyMap::new()),
        viewing: ViewingGeometry {
            distance_from_screen_mm: 800.0,
            monitor_width_mm: 532.0,
        },
        start_instant: Instant::now(),
    };
    (state, rx)
}
