// Tracker configuration options and validation rules.
// Invariants: validation runs before any hardware contact; settings are
// immutable once applied to a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_RECORDING_FILENAME_LEN: usize = 12;
pub const RECORDING_EXTENSION: &str = ".edf";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EyeMode {
    Left,
    Right,
    Both,
}

impl EyeMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "LEFT" => Ok(EyeMode::Left),
            "RIGHT" => Ok(EyeMode::Right),
            "BOTH" => Ok(EyeMode::Both),
            other => Err(ConfigError::InvalidEyeMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EyeMode::Left => "LEFT",
            EyeMode::Right => "RIGHT",
            EyeMode::Both => "BOTH",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("recording filename must be at most {MAX_RECORDING_FILENAME_LEN} characters long including the extension")]
    FilenameTooLong,
    #[error("recording filename must include the {RECORDING_EXTENSION} extension")]
    MissingExtension,
    #[error("eye must be set to LEFT, RIGHT, or BOTH, got {0:?}")]
    InvalidEyeMode(String),
}

/// The recording output name is constrained by the tracker's on-device
/// storage: at most 12 characters total, `.edf` extension included.
pub fn validate_recording_filename(filename: &str) -> Result<(), ConfigError> {
    if filename.len() > MAX_RECORDING_FILENAME_LEN {
        return Err(ConfigError::FilenameTooLong);
    }
    if !filename.ends_with(RECORDING_EXTENSION) {
        return Err(ConfigError::MissingExtension);
    }
    Ok(())
}

/// Recognized tracker options. Colors and sound toggles are retained for the
/// display layer but are not part of the configuration command sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub sample_rate: u32,
    pub calibration_type: String,
    pub elcl_configuration: String,
    pub calibration_area_proportion: (f64, f64),
    pub validation_area_proportion: (f64, f64),
    pub saccade_velocity_threshold: u32,
    pub saccade_acceleration_threshold: u32,
    pub saccade_motion_threshold: f64,
    pub saccade_pursuit_fixup: u32,
    pub pupil_size_diameter: bool,
    pub enable_automatic_calibration: bool,
    pub automatic_calibration_pacing: u32,
    pub preamble_text: Option<String>,
    pub foreground_color: (u8, u8, u8),
    pub background_color: (u8, u8, u8),
    pub good_sound: bool,
    pub error_sound: bool,
    pub target_sound: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            sample_rate: 1000,
            calibration_type: "HV9".to_string(),
            elcl_configuration: "BTABLER".to_string(),
            calibration_area_proportion: (0.5, 0.5),
            validation_area_proportion: (0.5, 0.5),
            saccade_velocity_threshold: 30,
            saccade_acceleration_threshold: 9500,
            saccade_motion_threshold: 0.15,
            saccade_pursuit_fixup: 60,
            pupil_size_diameter: false,
            enable_automatic_calibration: true,
            automatic_calibration_pacing: 1000,
            preamble_text: None,
            foreground_color: (255, 255, 255),
            background_color: (0, 0, 0),
            good_sound: false,
            error_sound: false,
            target_sound: false,
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

impl TrackingSettings {
    /// Renders the ordered configuration command sequence applied to the
    /// tracker after the session opens.
    pub fn command_messages(&self) -> Vec<String> {
        let mut messages = vec![
            format!("elcl_select_configuration = {}", self.elcl_configuration),
            format!(
                "automatic_calibration_pacing = {}",
                self.automatic_calibration_pacing
            ),
            format!(
                "calibration_area_proportion {:.6} {:.6}",
                self.calibration_area_proportion.0, self.calibration_area_proportion.1
            ),
            format!("calibration_type = {}", self.calibration_type),
            format!(
                "enable_automatic_calibration = {}",
                yes_no(self.enable_automatic_calibration)
            ),
        ];
        if let Some(preamble) = &self.preamble_text {
            messages.push(format!("add_file_preamble_text \"{preamble}\""));
        }
        messages.push(format!(
            "pupil_size_diameter = {}",
            yes_no(self.pupil_size_diameter)
        ));
        messages.push(format!(
            "saccade_acceleration_threshold = {}",
            self.saccade_acceleration_threshold
        ));
        messages.push(format!(
            "saccade_motion_threshold = {}",
            self.saccade_motion_threshold
        ));
        messages.push(format!(
            "saccade_pursuit_fixup = {}",
            self.saccade_pursuit_fixup
        ));
        messages.push(format!(
            "saccade_velocity_threshold = {}",
            self.saccade_velocity_threshold
        ));
        messages.push(format!("sample_rate = {}", self.sample_rate));
        messages.push(format!(
            "validation_area_proportion {:.6} {:.6}",
            self.validation_area_proportion.0, self.validation_area_proportion.1
        ));
        messages
    }
}
