// Viewing geometry conversion between visual angle and screen pixels.

/// Converts a threshold in degrees of visual angle to a pixel distance.
///
/// `distance_from_screen` and `monitor_width` share a unit (millimeters in
/// practice); `screen_res_x` is the horizontal resolution the monitor width
/// spans. Rounding is round-half-away-from-zero (`f64::round`).
pub fn deg2pix(
    threshold_deg: f64,
    distance_from_screen: f64,
    monitor_width: f64,
    screen_res_x: u32,
) -> i64 {
    let pixel_size = monitor_width / screen_res_x as f64;
    let linear_deviation = 2.0 * distance_from_screen * (threshold_deg.to_radians() / 2.0).tan();
    (linear_deviation / pixel_size).round() as i64
}
