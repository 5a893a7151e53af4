//! The chart frame: shared category axis plus one or two value domains.

use std::collections::{BTreeSet, HashSet};

use crate::domain::{DateKey, NormalizedSeries};
use crate::normalize::label;
use crate::scale::ValueDomain;

/// Palette slot of a ticker; equal to its position in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorAssignment {
    pub ticker: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    /// Sorted union of keys across both metrics.
    pub keys: Vec<DateKey>,
    pub primary: ValueDomain,
    pub secondary: Option<ValueDomain>,
    pub colors: Vec<ColorAssignment>,
}

/// Derive the frame from normalized series.
///
/// `secondary` is `None` when the chart has no secondary metric; an empty
/// slice still produces a (default) secondary domain.
pub fn build_frame(primary: &[NormalizedSeries], secondary: Option<&[NormalizedSeries]>) -> ChartFrame {
    let keys: BTreeSet<DateKey> = primary
        .iter()
        .chain(secondary.unwrap_or_default())
        .flat_map(|s| s.grouped.keys().cloned())
        .collect();

    let primary_domain = ValueDomain::including_zero(primary.iter().flat_map(NormalizedSeries::values));
    let secondary_domain =
        secondary.map(|series| ValueDomain::including_zero(series.iter().flat_map(NormalizedSeries::values)));

    // Colour by position, not identity: reordering tickers recolours them.
    let colors = primary
        .iter()
        .enumerate()
        .map(|(index, s)| ColorAssignment {
            ticker: s.ticker.clone(),
            index,
        })
        .collect();

    ChartFrame {
        keys: keys.into_iter().collect(),
        primary: primary_domain,
        secondary: secondary_domain,
        colors,
    }
}

/// One tick per distinct display label: `(key index, label)`.
pub fn category_ticks(keys: &[DateKey]) -> Vec<(usize, String)> {
    let mut seen = HashSet::new();
    keys.iter()
        .enumerate()
        .filter_map(|(i, key)| {
            let text = label(key);
            seen.insert(text.clone()).then_some((i, text))
        })
        .collect()
}
