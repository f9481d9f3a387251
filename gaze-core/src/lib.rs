// Shared tracker session and gaze analysis logic.

pub mod config;
pub mod geometry;
pub mod keys;
pub mod monitor;
pub mod sample;
pub mod session;
