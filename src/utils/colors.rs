/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

use crate::models::attendance::AttendanceStatus;
use crate::models::flow::FlowState;
use crate::models::window::TrendDirection;

pub fn color_for_status(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Complete => GREEN,
        AttendanceStatus::Incomplete => GREY,
        AttendanceStatus::PartialBreak => YELLOW,
    }
}

pub fn color_for_state(state: FlowState) -> &'static str {
    match state {
        FlowState::Pending => YELLOW,
        FlowState::Reviewed => CYAN,
        FlowState::Processed => GREEN,
    }
}

/// Up → green, down → red, stable → reset
pub fn color_for_trend(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Up => GREEN,
        TrendDirection::Down => RED,
        TrendDirection::Stable => RESET,
    }
}

/// Grey out placeholders such as `--` or an empty cell.
pub fn colorize_optional(value: &str) -> String {
    let v = value.trim();
    if v.is_empty() || v == "--" || v == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
