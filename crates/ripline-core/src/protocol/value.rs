//! Duration and size value codecs used by `TINFO` attributes.

use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Renders a duration as `H:MM:SS` (hours unpadded).
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

/// Parses `H:MM:SS`. Anything else, including values too large to
/// represent, yields zero.
pub fn parse_duration(s: &str) -> Duration {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return Duration::ZERO;
    }
    let mut secs = 0u64;
    for (part, scale) in parts.iter().zip([3600u64, 60, 1]) {
        let Ok(v) = part.parse::<u64>() else {
            return Duration::ZERO;
        };
        match v.checked_mul(scale).and_then(|x| secs.checked_add(x)) {
            Some(total) => secs = total,
            None => return Duration::ZERO,
        }
    }
    Duration::from_secs(secs)
}

/// Renders a byte count with 1024-based thresholds: one decimal for GB and
/// MB, integer KB, plain bytes below that.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Parses `<number> <unit>`. KB/MB/GB/TB scale by powers of 1024, any other
/// unit by 1. Malformed input yields zero.
pub fn parse_size(s: &str) -> u64 {
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() != 2 {
        return 0;
    }
    let Ok(magnitude) = parts[0].parse::<f64>() else {
        return 0;
    };
    if !magnitude.is_finite() || magnitude < 0.0 {
        return 0;
    }
    let multiplier = match parts[1].to_ascii_uppercase().as_str() {
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        "TB" => GB * 1024,
        _ => 1,
    };
    (magnitude * multiplier as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_round_trip_is_exact() {
        let d = Duration::from_secs(2 * 3600 + 30 * 60 + 45);
        assert_eq!(format_duration(d), "2:30:45");
        assert_eq!(parse_duration(&format_duration(d)), d);
    }

    #[test]
    fn duration_pads_minutes_and_seconds() {
        assert_eq!(format_duration(Duration::from_secs(5)), "0:00:05");
        assert_eq!(format_duration(Duration::from_secs(3600 * 12 + 61)), "12:01:01");
    }

    #[test]
    fn malformed_duration_is_zero() {
        assert_eq!(parse_duration("1:30"), Duration::ZERO);
        assert_eq!(parse_duration("a:b:c"), Duration::ZERO);
        assert_eq!(parse_duration(""), Duration::ZERO);
    }

    #[test]
    fn overflowing_duration_is_zero() {
        assert_eq!(parse_duration("18446744073709551615:00:00"), Duration::ZERO);
        assert_eq!(parse_duration("9999999999999999:00:00"), Duration::ZERO);
        assert_eq!(parse_duration("0:00:18446744073709551615"), Duration::from_secs(u64::MAX));
        assert_eq!(parse_duration("1:00:18446744073709551615"), Duration::ZERO);
    }

    #[test]
    fn size_formatting_thresholds() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(100 * 1_048_576), "100.0 MB");
        assert_eq!(format_size(1_073_741_824), "1.0 GB");
    }

    #[test]
    fn size_boundaries_decode_back() {
        for bytes in [1024u64, 1_048_576, 1_073_741_824] {
            assert_eq!(parse_size(&format_size(bytes)), bytes);
        }
    }

    #[test]
    fn size_units_are_case_insensitive() {
        assert_eq!(parse_size("4.5 gb"), (4.5 * GB as f64) as u64);
        assert_eq!(parse_size("2 TB"), 2 * 1024 * GB);
    }

    #[test]
    fn unknown_unit_multiplies_by_one() {
        assert_eq!(parse_size("42 B"), 42);
        assert_eq!(parse_size("42 bytes"), 42);
    }

    #[test]
    fn malformed_size_is_zero() {
        assert_eq!(parse_size("lots"), 0);
        assert_eq!(parse_size("x MB"), 0);
        assert_eq!(parse_size("1 2 MB"), 0);
    }
}
