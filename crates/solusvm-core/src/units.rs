//! Human-readable byte counts with binary-prefix units.

const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Unit used when the magnitude falls outside [`UNITS`].
const FALLBACK_UNIT: &str = "GB";

/// Format a byte count as `<value with two decimals><unit>`.
///
/// The unit is chosen by `floor(log1024(bytes))`; zero is special-cased to `"0.0B"`.
///
/// ```
/// use solusvm_core::units::format_bytes;
///
/// assert_eq!(format_bytes(0), "0.0B");
/// assert_eq!(format_bytes(1536), "1.50KB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0.0B".to_string();
    }

    // floor(log2(b)) / 10 == floor(log1024(b)), without float rounding at exact powers.
    let pow = bytes.ilog2() / 10;
    let unit = UNITS.get(pow as usize).copied().unwrap_or(FALLBACK_UNIT);

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    let value = bytes as f64 / 1024_f64.powi(pow as i32);
    format!("{value:.2}{unit}")
}

/// Like [`format_bytes`], rendering negative counts as `-` followed by the magnitude.
#[must_use]
pub fn format_signed_bytes(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", format_bytes(bytes.unsigned_abs()))
    } else {
        format_bytes(bytes.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_special_cased() {
        assert_eq!(format_bytes(0), "0.0B");
    }

    #[test]
    fn test_exact_powers_of_1024() {
        assert_eq!(format_bytes(1), "1.00B");
        assert_eq!(format_bytes(1024), "1.00KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00GB");
        assert_eq!(format_bytes(1024_u64.pow(4)), "1.00TB");
        assert_eq!(format_bytes(1024_u64.pow(5)), "1.00PB");
        assert_eq!(format_bytes(1024_u64.pow(6)), "1.00EB");
    }

    #[test]
    fn test_values_between_units() {
        assert_eq!(format_bytes(1023), "1023.00B");
        assert_eq!(format_bytes(1536), "1.50KB");
        assert_eq!(format_bytes(10_737_418_240), "10.00GB");
        assert_eq!(format_bytes(5_368_709_120 + 536_870_912), "5.50GB");
    }

    #[test]
    fn test_largest_value() {
        assert_eq!(format_bytes(u64::MAX), "16.00EB");
    }

    #[test]
    fn test_signed_bytes() {
        assert_eq!(format_signed_bytes(0), "0.0B");
        assert_eq!(format_signed_bytes(2048), "2.00KB");
        assert_eq!(format_signed_bytes(-2048), "-2.00KB");
        assert_eq!(format_signed_bytes(i64::MIN), "-8.00EB");
    }
}
