/// Seconds with two decimals, the way every time in the app is displayed.
pub fn format_seconds(secs: f64) -> String {
    format!("{:.2}", secs)
}
