//! Small shared helpers: time seeding, timestamp formatting, and tolerant
//! text decoding.

use std::borrow::Cow;

/// Get a time-based seed value for pseudo-random number generation.
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Format a Unix timestamp as an ISO-8601 UTC string (`CCYY-MM-DDThh:mm:ssZ`),
/// the form EPUB 3 requires for `dcterms:modified`.
pub fn format_utc_timestamp(unix_secs: u64) -> String {
    let days = (unix_secs / 86_400) as i64;
    let secs_of_day = unix_secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

/// Convert days since the Unix epoch to a (year, month, day) civil date.
/// Howard Hinnant's branchless algorithm, valid for the full i64 day range.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding
/// 3. Falls back to Windows-1252 (common in legacy text files)
///
/// # Arguments
///
/// * `bytes` - The raw bytes to decode
/// * `hint_encoding` - Optional encoding label, e.g. from a CLI flag
///
/// # Returns
///
/// The decoded string. Uses `Cow<str>` to avoid allocation when the input is
/// valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    // Try UTF-8 first (handles BOM automatically)
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    // If UTF-8 failed, try the hint encoding
    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    // Fallback: Windows-1252 (superset of ISO-8859-1)
    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_utf8_borrows() {
        let bytes = "# Heading\n\nPlain paragraph.".as_bytes();
        let decoded = decode_text(bytes, None);
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "# Heading\n\nPlain paragraph.");
    }

    #[test]
    fn test_decode_text_windows_1252_fallback() {
        // 0xE9 is 'é' in Windows-1252 but malformed as UTF-8
        let bytes = b"caf\xe9";
        assert_eq!(decode_text(bytes, None), "café");
    }

    #[test]
    fn test_decode_text_honors_hint() {
        // 0xA4 is '€' in ISO-8859-15 but '¤' in Windows-1252
        let bytes = b"price: \xa4";
        assert_eq!(decode_text(bytes, Some("iso-8859-15")), "price: €");
        assert_eq!(decode_text(bytes, None), "price: ¤");
    }

    #[test]
    fn test_decode_text_strips_utf8_bom() {
        let bytes = b"\xef\xbb\xbfhello";
        assert_eq!(decode_text(bytes, None), "hello");
    }

    #[test]
    fn test_format_utc_timestamp_epoch() {
        assert_eq!(format_utc_timestamp(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_utc_timestamp(86_399), "1970-01-01T23:59:59Z");
    }

    #[test]
    fn test_format_utc_timestamp_modern_date() {
        assert_eq!(format_utc_timestamp(1_714_521_600), "2024-05-01T00:00:00Z");
    }

    #[test]
    fn test_format_utc_timestamp_leap_day() {
        // 2024-02-29 12:00:00 UTC
        assert_eq!(format_utc_timestamp(1_709_208_000), "2024-02-29T12:00:00Z");
    }
}
