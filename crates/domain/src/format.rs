use chrono::{DateTime, NaiveDateTime, Utc};

/// Display sentinel for absent values.
pub const PLACEHOLDER: &str = "-";

/// Formats a timestamp for table rows and detail panels, `-` when absent.
#[must_use]
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(value) => value.format("%d/%m/%Y %H:%M").to_string(),
        None => PLACEHOLDER.to_owned(),
    }
}

/// Parses an audit payload timestamp (RFC 3339 with or without offset).
#[must_use]
pub fn parse_audit_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Unified audit exports commonly omit the offset; they are UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a byte count with a binary unit, e.g. `1.5 KB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_owned();
    }

    let exponent = (bytes.ilog2() / 10).min(3) as usize;
    let scaled = bytes as f64 / f64::from(1u32 << (10 * exponent as u32));
    let rounded = (scaled * 100.0).round() / 100.0;

    format!("{} {}", trim_decimal(rounded), UNITS[exponent])
}

/// Converts backslash folder path separators to forward slashes.
#[must_use]
pub fn normalize_folder_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{format_bytes, format_timestamp, normalize_folder_path, parse_audit_timestamp};

    #[test]
    fn timestamp_renders_day_first() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).single();
        assert_eq!(
            format_timestamp(timestamp.as_ref()),
            "09/03/2024 14:05".to_owned()
        );
    }

    #[test]
    fn missing_timestamp_renders_placeholder() {
        assert_eq!(format_timestamp(None), "-");
    }

    #[test]
    fn audit_timestamp_parses_without_offset() {
        let parsed = parse_audit_timestamp("2024-03-09T14:05:00");
        assert!(parsed.is_some());
    }

    #[test]
    fn audit_timestamp_parses_with_offset() {
        let parsed = parse_audit_timestamp("2024-03-09T14:05:00Z");
        assert!(parsed.is_some());
    }

    #[test]
    fn bytes_format_scales_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2 MB");
    }

    #[test]
    fn folder_paths_use_forward_slashes() {
        assert_eq!(
            normalize_folder_path("\\Inbox\\Archive"),
            "/Inbox/Archive".to_owned()
        );
    }
}
