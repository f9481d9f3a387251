// Gaze deviation checks for the real-time monitor loop.

use crate::sample::GazeSample;

/// Result of one monitor tick against the deviation threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickCheck {
    /// Neither eye reported data; the tick is skipped, not counted as a
    /// violation.
    NoData,
    Within,
    /// Distance exceeded the threshold; coordinates are relative to the
    /// screen center, in pixels.
    Violated { x: f64, y: f64 },
}

/// Terminal status of a monitor run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MonitorOutcome {
    Completed,
    Violated { x: f64, y: f64 },
}

pub fn check_tick(sample: &GazeSample, center: (f64, f64), threshold_px: f64) -> TickCheck {
    let Some((x, y)) = sample.reduce() else {
        return TickCheck::NoData;
    };
    let dx = x - center.0;
    let dy = y - center.1;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance > threshold_px {
        TickCheck::Violated { x: dx, y: dy }
    } else {
        TickCheck::Within
    }
}
