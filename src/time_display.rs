//! Elapsed/total playback time text.

/// Format seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped at the hour; negative or non-finite input
/// formats as `00:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Time display that only reports text when it changes
#[derive(Debug, Default)]
pub struct TimeDisplay {
    text: String,
}

impl TimeDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Update with the current position; returns the new text if it changed
    pub fn update(&mut self, elapsed: f64, duration: f64) -> Option<&str> {
        let text = format!("{} // {}", format_time(elapsed), format_time(duration));
        if text == self.text {
            return None;
        }
        self.text = text;
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.0), "01:05");
        assert_eq!(format_time(3599.0), "59:59");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(59.999), "00:59");
    }

    #[test]
    fn test_format_time_degenerate_input() {
        assert_eq!(format_time(-3.0), "00:00");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
    }

    #[test]
    fn test_display_reports_changes_only() {
        let mut display = TimeDisplay::new();
        assert_eq!(display.update(0.2, 200.0), Some("00:00 // 03:20"));
        assert_eq!(display.update(0.9, 200.0), None);
        assert_eq!(display.update(65.0, 200.0), Some("01:05 // 03:20"));
        assert_eq!(display.text(), "01:05 // 03:20");
    }
}
