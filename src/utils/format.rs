/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Live countdown, "HH:MM:SS"
pub fn format_countdown(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// "on"/"off" marker for a notification toggle
pub fn format_toggle(enabled: bool) -> &'static str {
    if enabled { "🔔 on" } else { "🔕 off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(59), "0m");
        assert_eq!(format_duration_secs(5400), "1h 30m");
        assert_eq!(format_duration_secs(600), "10m");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(3725), "01:02:05");
        assert_eq!(format_countdown(-4), "00:00:00");
        assert_eq!(format_countdown(86399), "23:59:59");
    }
}
