use std::time::Duration;

/// Parse a duration string like "30s", "5m", "1h" or "1m30s".
///
/// # Supported units
/// * "ms" - milliseconds
/// * "s" - seconds
/// * "m" - minutes
/// * "h" - hours
///
/// Groups may be chained and may carry a fractional number ("1.5s").
/// A bare number without a unit is rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input == "0" {
        return Some(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let value: f64 = rest[..num_end].parse().ok()?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit: f64 = match &rest[..unit_end] {
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_end..];

        let nanos = (value * nanos_per_unit).round();
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return None;
        }
        total = total.checked_add(Duration::from_nanos(nanos as u64))?;
    }

    Some(total)
}
