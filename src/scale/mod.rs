//! Scales: value domains, linear/band/point mappings and tick generation.
//!
//! Domains are computed once per fetch (`ChartFrame`); pixel ranges are only
//! attached at layout time, so a resize never touches the data side.

pub mod format;
pub mod frame;

pub use format::{format_abbrev, format_value};
pub use frame::{ChartFrame, ColorAssignment, build_frame, category_ticks};

/// Default number of value ticks the domain is rounded for.
pub const DEFAULT_TICKS: usize = 10;

/// Closed value interval of one vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    /// Domain covering `values` and zero, rounded outward to nice bounds.
    ///
    /// Empty input gives `[0, 1]`.
    pub fn including_zero(values: impl IntoIterator<Item = f64>) -> Self {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in values.into_iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return Self { min: 0.0, max: 1.0 };
        }
        let mut domain = Self {
            min: lo.min(0.0),
            max: hi.max(0.0),
        };
        if domain.max - domain.min <= 0.0 {
            // All values are zero.
            domain.max = 1.0;
        }
        domain.nice(DEFAULT_TICKS)
    }

    /// Extend both bounds outward to multiples of a 1/2/5 step.
    ///
    /// Never shrinks the domain.
    pub fn nice(self, count: usize) -> Self {
        let (mut lo, mut hi) = (self.min, self.max);
        let mut prev: Option<Step> = None;
        // The step can change once the bounds move; iterate until it settles.
        for _ in 0..10 {
            let Some(step) = Step::for_span(lo, hi, count) else {
                break;
            };
            if prev == Some(step) {
                break;
            }
            lo = step.floor(lo);
            hi = step.ceil(hi);
            prev = Some(step);
        }
        Self {
            min: lo.min(self.min),
            max: hi.max(self.max),
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let Some(step) = Step::for_span(self.min, self.max, count) else {
            return vec![self.min];
        };
        let first = step.index_ceil(self.min);
        let last = step.index_floor(self.max);
        (first..=last).map(|i| step.value(i)).collect()
    }
}

/// Tick spacing. Sub-unit steps are kept as an integer inverse so tick values
/// come out as `3 / 10` rather than `3 * 0.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Mul(f64),
    Div(f64),
}

impl Step {
    fn for_span(lo: f64, hi: f64, count: usize) -> Option<Self> {
        let span = hi - lo;
        if !(span.is_finite() && span > 0.0) || count == 0 {
            return None;
        }
        let raw = span / count as f64;
        let power = raw.log10().floor();
        let error = raw / 10f64.powf(power);
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };
        if power < 0.0 {
            let inv = 10f64.powf(-power) / factor;
            Some(Step::Div(inv))
        } else {
            Some(Step::Mul(factor * 10f64.powf(power)))
        }
    }

    fn index_floor(self, v: f64) -> i64 {
        match self {
            Step::Mul(s) => (v / s).floor() as i64,
            Step::Div(inv) => (v * inv).floor() as i64,
        }
    }

    fn index_ceil(self, v: f64) -> i64 {
        match self {
            Step::Mul(s) => (v / s).ceil() as i64,
            Step::Div(inv) => (v * inv).ceil() as i64,
        }
    }

    fn value(self, i: i64) -> f64 {
        match self {
            Step::Mul(s) => i as f64 * s,
            Step::Div(inv) => i as f64 / inv,
        }
    }

    fn floor(self, v: f64) -> f64 {
        self.value(self.index_floor(v))
    }

    fn ceil(self, v: f64) -> f64 {
        self.value(self.index_ceil(v))
    }
}

/// Continuous mapping from a value domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: ValueDomain,
    /// Pixel positions of `domain.min` and `domain.max` (may be inverted).
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: ValueDomain, range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let span = self.domain.max - self.domain.min;
        if span == 0.0 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        let t = (v - self.domain.min) / span;
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

/// Evenly spaced bands (grouped bars), with `padding` as a share of the step
/// both between bands and at the outer edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    bandwidth: f64,
    len: usize,
}

impl BandScale {
    pub fn new(len: usize, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = len as f64;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            start,
            step,
            bandwidth: step * (1.0 - padding),
            len,
        }
    }

    /// Left edge of band `i`.
    pub fn position(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Evenly spaced points (line charts). A single point sits in the middle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointScale {
    start: f64,
    step: f64,
}

impl PointScale {
    pub fn new(len: usize, range: (f64, f64)) -> Self {
        let (r0, r1) = range;
        let gaps = len.saturating_sub(1) as f64;
        let step = (r1 - r0) / gaps.max(1.0);
        let start = r0 + (r1 - r0 - step * gaps) * 0.5;
        Self { start, step }
    }

    pub fn position(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_values_include_zero() {
        let d = ValueDomain::including_zero([12.0, 37.0, 81.0]);
        assert!(d.min <= 0.0);
        assert_eq!(d.min, 0.0);
        assert_eq!(d.max, 90.0);
    }

    #[test]
    fn negative_values_include_zero() {
        let d = ValueDomain::including_zero([-3.2, -0.4]);
        assert!(d.max >= 0.0);
        assert_eq!(d.max, 0.0);
        assert!(d.min <= -3.2);
    }

    #[test]
    fn nice_never_shrinks() {
        let cases = [
            (0.0, 0.7),
            (-13.7, 2.1),
            (0.0, 1.23e11),
            (-4.4e9, 9.9e9),
            (0.0, 0.000_37),
            (0.0, 1.0),
        ];
        for (lo, hi) in cases {
            let d = ValueDomain { min: lo, max: hi }.nice(DEFAULT_TICKS);
            assert!(d.min <= lo && d.max >= hi, "{lo}..{hi} -> {d:?}");
        }
    }

    #[test]
    fn empty_and_zero_domains() {
        assert_eq!(ValueDomain::including_zero(Vec::<f64>::new()), ValueDomain { min: 0.0, max: 1.0 });
        assert_eq!(ValueDomain::including_zero([0.0, 0.0]), ValueDomain { min: 0.0, max: 1.0 });
        assert_eq!(
            ValueDomain::including_zero([f64::NAN]),
            ValueDomain { min: 0.0, max: 1.0 }
        );
    }

    #[test]
    fn ticks_are_clean() {
        let d = ValueDomain { min: 0.0, max: 1.0 };
        let ticks = d.ticks(5);
        assert_eq!(ticks, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let d = ValueDomain { min: -20.0, max: 100.0 };
        let ticks = d.ticks(6);
        assert_eq!(ticks.first(), Some(&-20.0));
        assert_eq!(ticks.last(), Some(&100.0));
        assert!(ticks.contains(&0.0));
    }

    #[test]
    fn linear_maps_inverted_range() {
        let s = LinearScale::new(ValueDomain { min: 0.0, max: 100.0 }, (340.0, 40.0));
        assert_eq!(s.map(0.0), 340.0);
        assert_eq!(s.map(100.0), 40.0);
        assert_eq!(s.map(50.0), 190.0);
    }

    #[test]
    fn band_layout() {
        let b = BandScale::new(3, (0.0, 320.0), 0.2);
        // step = 320 / (3 - 0.2 + 0.4) = 100
        assert!((b.position(0) - 20.0).abs() < 1e-9);
        assert!((b.position(1) - 120.0).abs() < 1e-9);
        assert!((b.bandwidth() - 80.0).abs() < 1e-9);
        assert!(b.position(2) + b.bandwidth() <= 320.0 + 1e-9);
    }

    #[test]
    fn point_layout() {
        let p = PointScale::new(3, (0.0, 200.0));
        assert_eq!(p.position(0), 0.0);
        assert_eq!(p.position(2), 200.0);

        let single = PointScale::new(1, (0.0, 200.0));
        assert_eq!(single.position(0), 100.0);
    }
}
