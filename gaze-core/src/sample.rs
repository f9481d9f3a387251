// Gaze sample model and single-point reduction.

use serde::{Deserialize, Serialize};

/// One eye's gaze position in screen pixels. Either coordinate may be
/// absent when the tracker reports no data for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EyeGaze {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl EyeGaze {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

/// The most recent gaze reading. Monocular modes populate one side only;
/// binocular mode may carry both, either, or neither eye.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub left: Option<EyeGaze>,
    pub right: Option<EyeGaze>,
}

fn mean_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

impl GazeSample {
    pub fn left_at(x: f64, y: f64) -> Self {
        Self {
            left: Some(EyeGaze::at(x, y)),
            right: None,
        }
    }

    pub fn right_at(x: f64, y: f64) -> Self {
        Self {
            left: None,
            right: Some(EyeGaze::at(x, y)),
        }
    }

    pub fn both_at(left: (f64, f64), right: (f64, f64)) -> Self {
        Self {
            left: Some(EyeGaze::at(left.0, left.1)),
            right: Some(EyeGaze::at(right.0, right.1)),
        }
    }

    /// Reduces the sample to a single position estimate: both eyes present
    /// are averaged coordinate-wise ignoring missing values, one eye is used
    /// as-is, and no data yields `None`.
    pub fn reduce(&self) -> Option<(f64, f64)> {
        let x = mean_present(
            self.left.and_then(|eye| eye.x),
            self.right.and_then(|eye| eye.x),
        );
        let y = mean_present(
            self.left.and_then(|eye| eye.y),
            self.right.and_then(|eye| eye.y),
        );
        match (x, y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }
}
