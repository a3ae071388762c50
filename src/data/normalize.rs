//! Unit-aware value normalization and display formatting

use crate::constants::units::{HOURS_PER_DAY, HOURS_PER_MONTH, RATIO_FRACTION_MAX};
use crate::data::payload::{MetricUnit, RawValue};

/// Convert a raw wire value into its chart-ready form.
///
/// Accepts numbers and numeric-looking strings; returns `None` for missing or
/// non-finite values. Ratio values at or below the fraction threshold are
/// scaled to percent, larger ratio values pass through unchanged.
pub fn normalize(raw: Option<&RawValue>, unit: MetricUnit) -> Option<f64> {
    let v = match raw? {
        RawValue::Num(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    if !v.is_finite() {
        return None;
    }
    match unit {
        MetricUnit::Ratio if v <= RATIO_FRACTION_MAX => Some(v * 100.0),
        _ => Some(v),
    }
}

/// Format a normalized value for axis ticks and tooltips
pub fn format_value(v: f64, unit: MetricUnit) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    match unit {
        MetricUnit::Ratio => format!("{v:.1}%"),
        MetricUnit::Hours => format_hours_adaptive(v),
        MetricUnit::Count => group_thousands(v.round() as i64),
    }
}

/// Format an hour quantity in the most readable duration unit.
///
/// At or above 30 days the value renders in months, at or above one day in
/// days (one decimal while the magnitude is below 10, none otherwise), and
/// below one day in hours with two decimals.
pub fn format_hours_adaptive(hours: f64) -> String {
    if !hours.is_finite() {
        return "-".to_string();
    }
    let magnitude = hours.abs();
    if magnitude >= HOURS_PER_MONTH {
        let months = hours / HOURS_PER_MONTH;
        if months.abs() < 10.0 {
            format!("{months:.1}개월")
        } else {
            format!("{months:.0}개월")
        }
    } else if magnitude >= HOURS_PER_DAY {
        let days = hours / HOURS_PER_DAY;
        if days.abs() < 10.0 {
            format!("{days:.1}일")
        } else {
            format!("{days:.0}일")
        }
    } else {
        format!("{hours:.2}시간")
    }
}

/// Comma-grouped rendering of a signed integer
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Option<RawValue> {
        Some(RawValue::Num(v))
    }

    #[test]
    fn test_ratio_fraction_threshold() {
        assert_eq!(normalize(num(0.5).as_ref(), MetricUnit::Ratio), Some(50.0));
        assert_eq!(normalize(num(1.0).as_ref(), MetricUnit::Ratio), Some(100.0));
        // At the threshold: still treated as a fraction
        let at = normalize(num(1.000001).as_ref(), MetricUnit::Ratio).unwrap();
        assert!((at - 100.0001).abs() < 1e-9);
        // Past it: already a percentage
        assert_eq!(normalize(num(1.01).as_ref(), MetricUnit::Ratio), Some(1.01));
        assert_eq!(normalize(num(37.5).as_ref(), MetricUnit::Ratio), Some(37.5));
    }

    #[test]
    fn test_count_and_hours_pass_through() {
        assert_eq!(normalize(num(42.0).as_ref(), MetricUnit::Count), Some(42.0));
        assert_eq!(normalize(num(0.5).as_ref(), MetricUnit::Hours), Some(0.5));
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let text = Some(RawValue::Text(" 5.5 ".to_string()));
        assert_eq!(normalize(text.as_ref(), MetricUnit::Count), Some(5.5));
        let bad = Some(RawValue::Text("n/a".to_string()));
        assert_eq!(normalize(bad.as_ref(), MetricUnit::Count), None);
    }

    #[test]
    fn test_missing_and_non_finite_dropped() {
        assert_eq!(normalize(None, MetricUnit::Count), None);
        assert_eq!(normalize(num(f64::NAN).as_ref(), MetricUnit::Count), None);
        assert_eq!(normalize(num(f64::INFINITY).as_ref(), MetricUnit::Ratio), None);
    }

    #[test]
    fn test_hours_adaptive_boundaries() {
        assert_eq!(format_hours_adaptive(23.99), "23.99시간");
        assert_eq!(format_hours_adaptive(25.0), "1.0일");
        assert_eq!(format_hours_adaptive(240.0), "10일");
        assert_eq!(format_hours_adaptive(721.0), "1.0개월");
        assert_eq!(format_hours_adaptive(7200.0), "10개월");
        assert_eq!(format_hours_adaptive(-25.0), "-1.0일");
    }

    #[test]
    fn test_format_value_per_unit() {
        assert_eq!(format_value(12.34, MetricUnit::Ratio), "12.3%");
        assert_eq!(format_value(1_234_567.4, MetricUnit::Count), "1,234,567");
        assert_eq!(format_value(3.0, MetricUnit::Hours), "3.00시간");
        assert_eq!(format_value(f64::NAN, MetricUnit::Count), "-");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(-1234567), "-1,234,567");
    }
}
