//! Debounced container-size tracking.

use std::time::{Duration, Instant};

use crate::render::Size;

/// Quiet period after the last size change before a redraw is requested.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(50);

/// Coalesces bursts of size observations into a single redraw request.
///
/// Callers pass the clock in, so the same type drives a terminal event loop
/// and deterministic tests.
#[derive(Debug, Clone)]
pub struct ResizeController {
    quiet: Duration,
    pending: Option<(Size, Instant)>,
    drawn: Option<Size>,
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

impl ResizeController {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            drawn: None,
        }
    }

    /// Record the size seen at `now`.
    pub fn observe(&mut self, size: Size, now: Instant) {
        match self.pending {
            Some((pending, _)) if pending == size => {}
            _ if self.pending.is_none() && self.drawn == Some(size) => {}
            _ => self.pending = Some((size, now)),
        }
    }

    /// The size to redraw at, once it has been stable for the quiet period
    /// and differs from the last one drawn.
    pub fn poll(&mut self, now: Instant) -> Option<Size> {
        let (size, since) = self.pending?;
        if now.saturating_duration_since(since) < self.quiet {
            return None;
        }
        self.pending = None;
        if self.drawn == Some(size) {
            return None;
        }
        self.drawn = Some(size);
        Some(size)
    }

    /// Note a size that was drawn outside the debounce path (first paint).
    pub fn mark_drawn(&mut self, size: Size) {
        self.drawn = Some(size);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left until `poll` can fire, for event-loop timeouts.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, since)| self.quiet.saturating_sub(now.saturating_duration_since(since)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_last_size() {
        let t0 = Instant::now();
        let mut rc = ResizeController::default();
        rc.mark_drawn(Size::new(800, 400));

        for (i, w) in [810, 820, 830, 840].into_iter().enumerate() {
            rc.observe(Size::new(w, 400), t0 + Duration::from_millis(10 * i as u64));
            assert_eq!(rc.poll(t0 + Duration::from_millis(10 * i as u64 + 5)), None);
        }
        assert_eq!(rc.poll(t0 + Duration::from_millis(60)), None);
        assert_eq!(rc.poll(t0 + Duration::from_millis(80)), Some(Size::new(840, 400)));
        assert_eq!(rc.poll(t0 + Duration::from_millis(200)), None);
    }

    #[test]
    fn returning_to_drawn_size_is_silent() {
        let t0 = Instant::now();
        let mut rc = ResizeController::default();
        rc.mark_drawn(Size::new(800, 400));

        rc.observe(Size::new(900, 400), t0);
        rc.observe(Size::new(800, 400), t0 + Duration::from_millis(20));
        assert_eq!(rc.poll(t0 + Duration::from_millis(100)), None);
        assert!(!rc.is_pending());

        rc.observe(Size::new(800, 400), t0 + Duration::from_millis(120));
        assert!(!rc.is_pending());
    }

    #[test]
    fn repeated_size_keeps_original_timer() {
        let t0 = Instant::now();
        let mut rc = ResizeController::new(Duration::from_millis(50));
        rc.observe(Size::new(640, 480), t0);
        rc.observe(Size::new(640, 480), t0 + Duration::from_millis(40));
        assert_eq!(rc.time_left(t0 + Duration::from_millis(40)), Some(Duration::from_millis(10)));
        assert_eq!(rc.poll(t0 + Duration::from_millis(50)), Some(Size::new(640, 480)));
    }
}
