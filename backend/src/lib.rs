// Crate root for the GazeLink bridge server modules.

pub mod app;
pub mod bridge;
pub mod constants;
pub mod dispatch;
pub mod driver;
pub mod http;
pub mod monitor;
pub mod protocol;
#[cfg(test)]
mod testutil;
pub mod utils;
pub mod ws;
