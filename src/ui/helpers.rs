use anyhow::Error;
use chrono::NaiveDateTime;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Render a start time the way the directory pages show it, e.g.
/// `Sun Apr 01, 2035 8:00 PM`.
pub(crate) fn format_start_time(start_time: NaiveDateTime) -> String {
    start_time.format("%a %b %d, %Y %-I:%M %p").to_string()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn start_times_render_in_directory_style() {
        let start = NaiveDate::from_ymd_opt(2035, 4, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        assert_eq!(format_start_time(start), "Sun Apr 01, 2035 8:00 PM");
    }
}
