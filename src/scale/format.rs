//! Number formatting shared by axis ticks and tooltips.

const SUFFIXES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Abbreviate large magnitudes with a K/M/B/T suffix and two decimals.
///
/// Values below one thousand are rounded to two decimals and printed in their
/// shortest form, so `999.0` reads `999` and `12.5` reads `12.5`.
pub fn format_abbrev(v: f64) -> String {
    if !v.is_finite() {
        return "N/A".to_string();
    }
    let rounded = round2(v);
    let magnitude = rounded.abs();
    for (i, (threshold, suffix)) in SUFFIXES.into_iter().enumerate() {
        if magnitude < threshold {
            continue;
        }
        // 999.999K rounds to 1000.00K; promote it to the next suffix.
        if i > 0 && round2(v / threshold).abs() >= 1e3 {
            let (bigger, suffix) = SUFFIXES[i - 1];
            return format!("{:.2}{suffix}", v / bigger);
        }
        return format!("{:.2}{suffix}", v / threshold);
    }
    // Avoid printing "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Tooltip/table rendering of an optional value.
pub fn format_value(v: Option<f64>) -> String {
    v.map(format_abbrev).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations() {
        assert_eq!(format_abbrev(1_500_000.0), "1.50M");
        assert_eq!(format_abbrev(2_300_000_000.0), "2.30B");
        assert_eq!(format_abbrev(999.0), "999");
        assert_eq!(format_abbrev(1_000.0), "1.00K");
        assert_eq!(format_abbrev(3.2e12), "3.20T");
        assert_eq!(format_abbrev(-1_500_000.0), "-1.50M");
    }

    #[test]
    fn small_values_keep_two_decimals_at_most() {
        assert_eq!(format_abbrev(12.5), "12.5");
        assert_eq!(format_abbrev(0.1 + 0.2), "0.3");
        assert_eq!(format_abbrev(27.456), "27.46");
        assert_eq!(format_abbrev(0.0), "0");
        assert_eq!(format_abbrev(-0.001), "0");
    }

    #[test]
    fn rounding_crosses_suffix_boundaries() {
        assert_eq!(format_abbrev(999.999), "1.00K");
        assert_eq!(format_abbrev(-999.996), "-1.00K");
        assert_eq!(format_abbrev(999.994), "999.99");
        assert_eq!(format_abbrev(999_999.0), "1.00M");
        assert_eq!(format_abbrev(999_994_000.0), "999.99M");
    }

    #[test]
    fn missing_values() {
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(f64::NAN)), "N/A");
        assert_eq!(format_value(Some(2.0e9)), "2.00B");
    }
}
