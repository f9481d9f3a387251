// Device session lifecycle over an opaque tracker driver.
// Invariants: configuration is validated before any driver contact; all
// session mutation goes through these operations.

use serde::Serialize;
use thiserror::Error;

use crate::config::{validate_recording_filename, ConfigError, EyeMode, TrackingSettings};
use crate::sample::GazeSample;

/// Rendering capabilities the driver invokes synchronously during
/// calibration and drift correction. Delivery is fire-and-forget: the
/// driver never waits for a remote client to acknowledge rendering.
pub trait RenderSink: Send {
    fn setup_display(&mut self);
    fn teardown_display(&mut self);
    fn clear_display(&mut self);
    fn erase_target(&mut self);
    fn draw_target(&mut self, x: i32, y: i32);
    /// Non-fatal device warning; must not interrupt the current operation.
    fn alert(&mut self, message: &str);
}

/// Render sink that drops everything, for driverless tests and headless runs.
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn setup_display(&mut self) {}
    fn teardown_display(&mut self) {}
    fn clear_display(&mut self) {}
    fn erase_target(&mut self) {}
    fn draw_target(&mut self, _x: i32, _y: i32) {}
    fn alert(&mut self, _message: &str) {}
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("tracker rejected {operation}: {detail}")]
    Rejected {
        operation: &'static str,
        detail: String,
    },
}

/// Opaque hardware session collaborator. The physical tracking algorithm
/// and sampling live behind this trait.
pub trait TrackerDriver: Send {
    fn open_data_file(&mut self, filename: &str) -> Result<(), DriverError>;
    fn set_offline_mode(&mut self);
    fn flush_key_queue(&mut self);
    /// Configuration and synchronization messages, timestamped into the
    /// recording stream.
    fn send_message(&mut self, text: &str);
    fn send_command(&mut self, text: &str);
    fn start_recording(&mut self) -> Result<(), DriverError>;
    fn stop_recording(&mut self);
    /// Runs the calibration routine, driving the sink's callbacks.
    fn do_tracker_setup(&mut self, sink: &mut dyn RenderSink);
    fn do_drift_correct(
        &mut self,
        x: i32,
        y: i32,
        sink: &mut dyn RenderSink,
    ) -> Result<(), DriverError>;
    fn apply_drift_correct(&mut self);
    fn send_keybutton(&mut self, code: u16, modifiers: u16);
    fn newest_sample(&mut self) -> Option<GazeSample>;
    fn close(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Configured,
    Calibrating,
    Recording,
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("{operation} requires a configured session, state is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("session is closed")]
    Closed,
}

pub struct SessionConfig {
    pub filename: String,
    pub eye: EyeMode,
    pub resolution: (u32, u32),
    pub settings: TrackingSettings,
}

impl SessionConfig {
    pub fn new(filename: impl Into<String>, eye: EyeMode, resolution: (u32, u32)) -> Self {
        Self {
            filename: filename.into(),
            eye,
            resolution,
            settings: TrackingSettings::default(),
        }
    }
}

const FILE_EVENT_FILTER: &str =
    "file_event_filter = LEFT,RIGHT,FIXATION,SACCADE,BLINK,MESSAGE,BUTTON";
const FILE_SAMPLE_DATA: &str = "file_sample_data = LEFT,RIGHT,GAZE,AREA,GAZERES,STATUS";
const LINK_EVENT_FILTER: &str = "link_event_filter = LEFT,RIGHT,FIXATION,SACCADE,BLINK,BUTTON";
const LINK_SAMPLE_DATA: &str = "link_sample_data = LEFT,RIGHT,GAZE,GAZERES,AREA,STATUS";

/// One hardware session: owns the driver and the render sink, and tracks
/// the lifecycle state. One per process.
pub struct DeviceSession {
    driver: Box<dyn TrackerDriver>,
    sink: Box<dyn RenderSink>,
    state: SessionState,
    filename: String,
    eye: EyeMode,
    resolution: (u32, u32),
    settings: TrackingSettings,
}

impl DeviceSession {
    /// Validates the configuration, opens the hardware session, and applies
    /// resolution and every recognized setting. Validation failures return
    /// before the driver is touched.
    pub fn configure(
        mut driver: Box<dyn TrackerDriver>,
        sink: Box<dyn RenderSink>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        validate_recording_filename(&config.filename)?;

        driver.open_data_file(&config.filename)?;
        driver.set_offline_mode();
        driver.flush_key_queue();

        let (width, height) = config.resolution;
        driver.send_message(&format!("screen_pixel_coords = 0 0 {width} {height}"));
        driver.send_message(&format!("DISPLAY_COORDS 0 0 {width} {height}"));

        driver.send_command(FILE_EVENT_FILTER);
        driver.send_command(FILE_SAMPLE_DATA);
        driver.send_command(LINK_EVENT_FILTER);
        driver.send_command(LINK_SAMPLE_DATA);

        match config.eye {
            EyeMode::Both => driver.send_message("binocular_enabled = YES"),
            eye => {
                driver.send_message(&format!("active_eye = {}", eye.as_str()));
                driver.send_message("binocular_enabled = NO");
            }
        }

        for message in config.settings.command_messages() {
            driver.send_message(&message);
        }

        Ok(Self {
            driver,
            sink,
            state: SessionState::Configured,
            filename: config.filename,
            eye: config.eye,
            resolution: config.resolution,
            settings: config.settings,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn eye(&self) -> EyeMode {
        self.eye
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn settings(&self) -> &TrackingSettings {
        &self.settings
    }

    /// Screen center in pixels, the drift-correct target and the monitor's
    /// reference point.
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.resolution.0) / 2.0,
            f64::from(self.resolution.1) / 2.0,
        )
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    /// Forwarded to the driver unconditionally, even when already
    /// recording; the driver is responsible for idempotence.
    pub fn start_recording(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.driver.start_recording()?;
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Safe to call when not recording; forwarded to the driver either way.
    pub fn stop_recording(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.driver.stop_recording();
        if self.state == SessionState::Recording {
            self.state = SessionState::Configured;
        }
        Ok(())
    }

    /// Runs the driver's calibration routine. The driver invokes the render
    /// sink callbacks synchronously for the duration of the call.
    pub fn calibrate(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Configured {
            return Err(SessionError::InvalidState {
                operation: "calibrate",
                state: self.state,
            });
        }
        self.state = SessionState::Calibrating;
        self.driver.do_tracker_setup(self.sink.as_mut());
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Drift-corrects against the screen center and applies the correction.
    pub fn drift_correct(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Configured {
            return Err(SessionError::InvalidState {
                operation: "drift_correct",
                state: self.state,
            });
        }
        let (cx, cy) = self.center();
        self.driver
            .do_drift_correct(cx.round() as i32, cy.round() as i32, self.sink.as_mut())?;
        self.driver.apply_drift_correct();
        Ok(())
    }

    /// Forwards a resolved key code as a press event with no modifiers.
    pub fn send_key(&mut self, code: u16) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.driver.send_keybutton(code, 0);
        Ok(())
    }

    /// Timestamped synchronization marker in the recording stream.
    pub fn send_marker(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.driver.send_message(text);
        Ok(())
    }

    /// Free-text status annotation shown on the tracker host.
    pub fn set_status_message(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.driver
            .send_command(&format!("record_status_message '{text}'"));
        Ok(())
    }

    /// Most recent gaze sample, masked to the configured eye mode.
    pub fn newest_sample(&mut self) -> Option<GazeSample> {
        let mut sample = self.driver.newest_sample()?;
        match self.eye {
            EyeMode::Left => sample.right = None,
            EyeMode::Right => sample.left = None,
            EyeMode::Both => {}
        }
        Some(sample)
    }

    /// Releases the hardware session. Terminal.
    pub fn close(&mut self) {
        self.driver.close();
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum DriverOp {
        OpenDataFile(String),
        SetOfflineMode,
        FlushKeyQueue,
        Message(String),
        Command(String),
        StartRecording,
        StopRecording,
        TrackerSetup,
        DriftCorrect(i32, i32),
        ApplyDriftCorrect,
        KeyButton(u16, u16),
        Close,
    }

    #[derive(Default)]
    struct MockDriver {
        ops: Arc<Mutex<Vec<DriverOp>>>,
        sample: Option<GazeSample>,
    }

    impl MockDriver {
        fn with_log() -> (Self, Arc<Mutex<Vec<DriverOp>>>) {
            let ops = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    ops: ops.clone(),
                    sample: None,
                },
                ops,
            )
        }

        fn log(&self, op: DriverOp) {
            self.ops.lock().unwrap().push(op);
        }
    }

    impl TrackerDriver for MockDriver {
        fn open_data_file(&mut self, filename: &str) -> Result<(), DriverError> {
            self.log(DriverOp::OpenDataFile(filename.to_string()));
            Ok(())
        }

        fn set_offline_mode(&mut self) {
            self.log(DriverOp::SetOfflineMode);
        }

        fn flush_key_queue(&mut self) {
            self.log(DriverOp::FlushKeyQueue);
        }

        fn send_message(&mut self, text: &str) {
            self.log(DriverOp::Message(text.to_string()));
        }

        fn send_command(&mut self, text: &str) {
            self.log(DriverOp::Command(text.to_string()));
        }

        fn start_recording(&mut self) -> Result<(), DriverError> {
            self.log(DriverOp::StartRecording);
            Ok(())
        }

        fn stop_recording(&mut self) {
            self.log(DriverOp::StopRecording);
        }

        fn do_tracker_setup(&mut self, sink: &mut dyn RenderSink) {
            self.log(DriverOp::TrackerSetup);
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
            self.log(DriverOp::DriftCorrect(x, y));
            sink.draw_target(x, y);
            sink.erase_target();
            Ok(())
        }

        fn apply_drift_correct(&mut self) {
            self.log(DriverOp::ApplyDriftCorrect);
        }

        fn send_keybutton(&mut self, code: u16, modifiers: u16) {
            self.log(DriverOp::KeyButton(code, modifiers));
        }

        fn newest_sample(&mut self) -> Option<GazeSample> {
            self.sample
        }

        fn close(&mut self) {
            self.log(DriverOp::Close);
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RenderSink for RecordingSink {
        fn setup_display(&mut self) {
            self.calls.lock().unwrap().push("setup".to_string());
        }
        fn teardown_display(&mut self) {
            self.calls.lock().unwrap().push("teardown".to_string());
        }
        fn clear_display(&mut self) {
            self.calls.lock().unwrap().push("clear".to_string());
        }
        fn erase_target(&mut self) {
            self.calls.lock().unwrap().push("erase".to_string());
        }
        fn draw_target(&mut self, x: i32, y: i32) {
            self.calls.lock().unwrap().push(format!("draw {x} {y}"));
        }
        fn alert(&mut self, message: &str) {
            self.calls.lock().unwrap().push(format!("alert {message}"));
        }
    }

    fn configured_session() -> (DeviceSession, Arc<Mutex<Vec<DriverOp>>>) {
        let (driver, ops) = MockDriver::with_log();
        let session = DeviceSession::configure(
            Box::new(driver),
            Box::new(NullRenderSink),
            SessionConfig::new("ok.edf", EyeMode::Both, (1920, 1080)),
        )
        .expect("configure");
        (session, ops)
    }

    #[test]
    fn bad_filename_fails_before_driver_contact() {
        let (driver, ops) = MockDriver::with_log();
        let result = DeviceSession::configure(
            Box::new(driver),
            Box::new(NullRenderSink),
            SessionConfig::new("this_name_is_too_long.edf", EyeMode::Both, (1920, 1080)),
        );
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::FilenameTooLong))
        ));
        assert!(ops.lock().unwrap().is_empty(), "driver must not be touched");
    }

    #[test]
    fn wrong_extension_rejected() {
        let (driver, ops) = MockDriver::with_log();
        let result = DeviceSession::configure(
            Box::new(driver),
            Box::new(NullRenderSink),
            SessionConfig::new("ok.txt", EyeMode::Left, (1920, 1080)),
        );
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::MissingExtension))
        ));
        assert!(ops.lock().unwrap().is_empty());
    }

    #[test]
    fn configure_applies_resolution_and_settings() {
        let (session, ops) = configured_session();
        assert_eq!(session.state(), SessionState::Configured);

        let ops = ops.lock().unwrap();
        assert_eq!(ops[0], DriverOp::OpenDataFile("ok.edf".to_string()));
        assert_eq!(ops[1], DriverOp::SetOfflineMode);
        assert!(ops.contains(&DriverOp::Message(
            "screen_pixel_coords = 0 0 1920 1080".to_string()
        )));
        assert!(ops.contains(&DriverOp::Message("binocular_enabled = YES".to_string())));
        assert!(ops.contains(&DriverOp::Message("sample_rate = 1000".to_string())));
        assert!(ops.contains(&DriverOp::Command(FILE_EVENT_FILTER.to_string())));
    }

    #[test]
    fn monocular_mode_sets_active_eye() {
        let (driver, ops) = MockDriver::with_log();
        DeviceSession::configure(
            Box::new(driver),
            Box::new(NullRenderSink),
            SessionConfig::new("ok.edf", EyeMode::Right, (1920, 1080)),
        )
        .expect("configure");
        let ops = ops.lock().unwrap();
        assert!(ops.contains(&DriverOp::Message("active_eye = RIGHT".to_string())));
        assert!(ops.contains(&DriverOp::Message("binocular_enabled = NO".to_string())));
    }

    #[test]
    fn recording_lifecycle() {
        let (mut session, ops) = configured_session();
        session.start_recording().expect("start");
        assert_eq!(session.state(), SessionState::Recording);
        // double start is forwarded, not guarded here
        session.start_recording().expect("double start");
        session.stop_recording().expect("stop");
        assert_eq!(session.state(), SessionState::Configured);

        let starts = ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == DriverOp::StartRecording)
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn stop_when_not_recording_is_a_no_op_at_this_layer() {
        let (mut session, ops) = configured_session();
        session.stop_recording().expect("stop while configured");
        assert_eq!(session.state(), SessionState::Configured);
        assert!(ops.lock().unwrap().contains(&DriverOp::StopRecording));
    }

    #[test]
    fn calibrate_drives_sink_and_returns_to_configured() {
        let (driver, _ops) = MockDriver::with_log();
        let sink = RecordingSink::default();
        let calls = sink.calls.clone();
        let mut session = DeviceSession::configure(
            Box::new(driver),
            Box::new(sink),
            SessionConfig::new("ok.edf", EyeMode::Both, (1920, 1080)),
        )
        .expect("configure");

        session.calibrate().expect("calibrate");
        assert_eq!(session.state(), SessionState::Configured);
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["setup", "draw 960 540", "erase", "teardown"]
        );
    }

    #[test]
    fn calibrate_rejected_while_recording() {
        let (mut session, _ops) = configured_session();
        session.start_recording().expect("start");
        assert!(matches!(
            session.calibrate(),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[test]
    fn drift_correct_targets_screen_center() {
        let (mut session, ops) = configured_session();
        session.drift_correct().expect("drift correct");
        let ops = ops.lock().unwrap();
        assert!(ops.contains(&DriverOp::DriftCorrect(960, 540)));
        assert!(ops.contains(&DriverOp::ApplyDriftCorrect));
    }

    #[test]
    fn key_press_forwarded_without_modifiers() {
        let (mut session, ops) = configured_session();
        session.send_key(97).expect("send key");
        assert!(ops.lock().unwrap().contains(&DriverOp::KeyButton(97, 0)));
    }

    #[test]
    fn status_message_wrapped_as_command() {
        let (mut session, ops) = configured_session();
        session.set_status_message("block 1, trial 2").expect("status");
        assert!(ops.lock().unwrap().contains(&DriverOp::Command(
            "record_status_message 'block 1, trial 2'".to_string()
        )));
    }

    #[test]
    fn newest_sample_masks_by_eye_mode() {
        let (mut driver, _ops) = MockDriver::with_log();
        driver.sample = Some(GazeSample::both_at((10.0, 20.0), (30.0, 40.0)));
        let mut session = DeviceSession::configure(
            Box::new(driver),
            Box::new(NullRenderSink),
            SessionConfig::new("ok.edf", EyeMode::Left, (1920, 1080)),
        )
        .expect("configure");

        let sample = session.newest_sample().expect("sample");
        assert!(sample.left.is_some());
        assert!(sample.right.is_none());
    }

    #[test]
    fn close_is_terminal() {
        let (mut session, ops) = configured_session();
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(ops.lock().unwrap().contains(&DriverOp::Close));
        assert!(matches!(
            session.start_recording(),
            Err(SessionError::Closed)
        ));
        assert!(matches!(session.send_marker("SYNC 1"), Err(SessionError::Closed)));
    }
}
