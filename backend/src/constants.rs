// Shared constants for server timing, protocol, and defaults.

pub const MONITOR_TICK_MS: u64 = 50;
pub const DEFAULT_EYE_MAX_DIST_DEG: f64 = 1.25;
pub const DEFAULT_DISTANCE_FROM_SCREEN_MM: f64 = 800.0;
pub const DEFAULT_MONITOR_WIDTH_MM: f64 = 532.0;
pub const DEFAULT_SCREEN_WIDTH: u32 = 1920;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 1080;
pub const DEFAULT_RECORDING_FILE: &str = "TEST.edf";
pub const SYNC_KEYWORD: &str = "SYNC";
pub const STATUS_MESSAGE_MAX_LEN: usize = 80;
pub const BROADCAST_CAP: usize = 256;
