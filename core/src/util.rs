/// Extract a short type name from the full module path.
///
/// Given `"ag_select_core::filter::SurplusFilter"`, returns `"SurplusFilter"`.
pub fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Round to `places` decimal places for display and export.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
