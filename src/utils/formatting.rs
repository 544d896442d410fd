//! Formatting utilities used for CLI outputs.

use crate::utils::time::TimeOfDay;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// `8.50h`, or `--` while the day is incomplete.
pub fn fmt_hours(h: Option<f64>) -> String {
    match h {
        Some(v) => format!("{v:.2}h"),
        None => "--".to_string(),
    }
}

pub fn fmt_pct(p: f64) -> String {
    format!("{p:.2}%")
}

pub fn fmt_punch(t: Option<TimeOfDay>) -> String {
    t.map(|v| v.to_string()).unwrap_or_else(|| "--:--".to_string())
}
