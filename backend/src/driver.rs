// Dummy tracker driver for development without physical hardware.
// Mirrors the real driver's call surface; commands are logged, calibration
// renders a single center target through the sink, and no gaze data is
// reported.

use tracing::{debug, info};

use gaze_core::sample::GazeSample;
use gaze_core::session::{DriverError, RenderSink, TrackerDriver};

pub struct DummyDriver {
    resolution: (u32, u32),
    data_file: Option<String>,
    recording: bool,
}

impl DummyDriver {
    pub fn new(resolution: (u32, u32)) -> Self {
        Self {
            resolution,
            data_file: None,
            recording: false,
        }
    }

    fn center(&self) -> (i32, i32) {
        (
            (self.resolution.0 / 2) as i32,
            (self.resolution.1 / 2) as i32,
        )
    }
}

impl TrackerDriver for DummyDriver {
    fn open_data_file(&mut self, filename: &str) -> Result<(), DriverError> {
        info!(filename, "dummy driver: data file opened");
        self.data_file = Some(filename.to_string());
        Ok(())
    }

    fn set_offline_mode(&mut self) {
        debug!("dummy driver: offline mode");
    }

    fn flush_key_queue(&mut self) {
        debug!("dummy driver: key queue flushed");
    }

    fn send_message(&mut self, text: &str) {
        debug!(text, "dummy driver: message");
    }

    fn send_command(&mut self, text: &str) {
        debug!(text, "dummy driver: command");
    }

    fn start_recording(&mut self) -> Result<(), DriverError> {
        info!("dummy driver: recording started");
        self.recording = true;
        Ok(())
    }

    fn stop_recording(&mut self) {
        info!("dummy driver: recording stopped");
        self.recording = false;
    }

    fn do_tracker_setup(&mut self, sink: &mut dyn RenderSink) {
        info!("dummy driver: tracker setup");
        let (cx, cy) = self.center();
        sink.setup_display();
        sink.draw_target(cx, cy);
        sink.erase_target();
        sink.teardown_display();
    }

    fn do_drift_correct(
        &mut self,
        x: i32,
        y: i32,
        sink: &mut dyn RenderSink,
    ) -> Result<(), DriverError> {
        info!(x, y, "dummy driver: drift correct");
        sink.draw_target(x, y);
        sink.erase_target();
        Ok(())
    }

    fn apply_drift_correct(&mut self) {
        debug!("dummy driver: drift correction applied");
    }

    fn send_keybutton(&mut self, code: u16, modifiers: u16) {
        debug!(code, modifiers, "dummy driver: key button");
    }

    fn newest_sample(&mut self) -> Option<GazeSample> {
        None
    }

    fn close(&mut self) {
        info!("dummy driver: session closed");
        self.data_file = None;
        self.recording = false;
    }
}
