//! Display labels for bucket keys.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{DateKey, Interval};

static QUARTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-Q([1-4])$").expect("valid regex"));
static MONTH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("valid regex"));

/// Axis/tooltip label for a key.
///
/// - `2023`    -> `2023`
/// - `2023-03` -> `Mar 2023`
/// - `2023-Q1` -> `Q1 2023`
/// - anything else is shown verbatim
pub fn label(key: &DateKey) -> String {
    let raw = key.as_str();
    if let Some(caps) = QUARTER_KEY.captures(raw) {
        return format!("Q{} {}", &caps[2], &caps[1]);
    }
    if let Some(caps) = MONTH_KEY.captures(raw) {
        let year = caps[1].parse::<i32>().ok();
        let month = caps[2].parse::<u32>().ok();
        if let Some(d) = year.zip(month).and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1)) {
            return d.format("%b %Y").to_string();
        }
    }
    raw.to_string()
}

/// Title of the categorical axis.
pub fn axis_title(interval: Interval, keys: &[DateKey]) -> &'static str {
    match interval {
        Interval::Annual => "Year",
        Interval::Quarter if !keys.is_empty() && keys.iter().all(|k| QUARTER_KEY.is_match(k.as_str())) => {
            "Quarter"
        }
        Interval::Quarter => "Month",
    }
}
