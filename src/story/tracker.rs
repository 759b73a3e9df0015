/// Fraction of viewport height where the trigger band starts and ends. A
/// step is active while its midpoint sits inside the band.
const BAND_TOP: f32 = 0.25;
const BAND_BOTTOM: f32 = 0.75;

const LAYOUT_EPSILON: f32 = 0.5;

/// Maps continuous scroll position to the discrete active step.
///
/// The caller feeds it the measured step geometry each frame (content-space
/// tops and heights plus the viewport height) and the current scroll offset;
/// `observe` reports an index only when the active step actually changes.
#[derive(Debug, Default)]
pub struct ViewportTracker {
    tops: Vec<f32>,
    heights: Vec<f32>,
    viewport_h: f32,
    active: Option<usize>,
}

impl ViewportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes the cached step geometry. Returns true when anything moved,
    /// which is how a resize invalidates the previous layout. The active step
    /// is left alone; the next `observe` re-derives it from the new geometry.
    pub fn sync_layout(&mut self, tops: &[f32], heights: &[f32], viewport_h: f32) -> bool {
        let changed = !approx_matches(&self.tops, tops)
            || !approx_matches(&self.heights, heights)
            || (self.viewport_h - viewport_h).abs() > LAYOUT_EPSILON;

        if changed {
            self.tops = tops.to_vec();
            self.heights = heights.to_vec();
            self.viewport_h = viewport_h;
        }

        changed
    }

    /// Evaluates the trigger band at the given scroll offset. Returns the new
    /// active index on a change, `None` otherwise. When several steps sit in
    /// the band at once the last one in document order wins; when none do,
    /// the previous step stays active.
    pub fn observe(&mut self, scroll_top: f32) -> Option<usize> {
        if self.viewport_h <= 0.0 {
            return None;
        }

        let band_top = self.viewport_h * BAND_TOP;
        let band_bottom = self.viewport_h * BAND_BOTTOM;

        let mut hit = None;
        for (index, (&top, &height)) in self.tops.iter().zip(&self.heights).enumerate() {
            let midpoint = top - scroll_top + height * 0.5;
            if midpoint >= band_top && midpoint <= band_bottom {
                hit = Some(index);
            }
        }

        match hit {
            Some(index) if self.active != Some(index) => {
                self.active = Some(index);
                Some(index)
            }
            _ => None,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

fn approx_matches(cached: &[f32], fresh: &[f32]) -> bool {
    cached.len() == fresh.len()
        && cached.iter().zip(fresh).all(|(a, b)| (a - b).abs() <= LAYOUT_EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Three steps of height 600 stacked without gaps in a 1000px viewport.
    // The band is [250, 750] and the content midpoints are 300, 900, 1500,
    // so at most one step qualifies at a time.
    fn tracker() -> ViewportTracker {
        let mut tracker = ViewportTracker::new();
        tracker.sync_layout(&[0.0, 600.0, 1200.0], &[600.0, 600.0, 600.0], 1000.0);
        tracker
    }

    #[test]
    fn band_edges_are_inclusive() {
        // Scroll 50 puts step 0's midpoint at exactly 250, the band top.
        let mut tracker = tracker();
        assert_eq!(tracker.observe(50.0), Some(0));

        // One pixel shy of the band fires nothing.
        let mut shy = self::tracker();
        assert_eq!(shy.observe(51.0), None);
        assert_eq!(shy.active(), None);
    }

    #[test]
    fn last_qualifying_step_wins() {
        // Short steps so two midpoints share the band: at scroll -300 the
        // midpoints sit at 400, 600 and 800, so steps 0 and 1 both qualify.
        let mut tracker = ViewportTracker::new();
        tracker.sync_layout(&[0.0, 200.0, 400.0], &[200.0, 200.0, 200.0], 1000.0);

        assert_eq!(tracker.observe(-300.0), Some(1));
    }

    #[test]
    fn repeated_crossings_fire_once_each() {
        let mut tracker = tracker();
        let mut notifications = 0;

        for _ in 0..5 {
            // Step 0 centered in the band, then step 1.
            if tracker.observe(-200.0).is_some() {
                notifications += 1;
            }
            if tracker.observe(400.0).is_some() {
                notifications += 1;
            }
        }

        assert_eq!(notifications, 10);

        // Re-observing the same position is not a transition.
        assert_eq!(tracker.observe(400.0), None);
        assert_eq!(tracker.observe(400.0), None);
    }

    #[test]
    fn no_qualifier_keeps_the_previous_step() {
        let mut tracker = tracker();
        assert_eq!(tracker.observe(-200.0), Some(0));

        // Scroll far past everything: nothing in the band.
        assert_eq!(tracker.observe(5000.0), None);
        assert_eq!(tracker.active(), Some(0));
    }

    #[test]
    fn resize_rederives_from_new_geometry() {
        let mut tracker = tracker();
        assert_eq!(tracker.observe(-200.0), Some(0));

        // Steps shrink to 400: midpoints move to 200, 600, 1000.
        let changed = tracker.sync_layout(&[0.0, 400.0, 800.0], &[400.0, 400.0, 400.0], 1000.0);
        assert!(changed);
        assert_eq!(tracker.active(), Some(0));

        // Step 0 still owns the band at the old offset, so nothing fires.
        assert_eq!(tracker.observe(-200.0), None);

        // Centering step 1 under the new layout fires it.
        assert_eq!(tracker.observe(200.0), Some(1));
    }

    #[test]
    fn unchanged_layout_reports_no_invalidation() {
        let mut tracker = tracker();
        let changed = tracker.sync_layout(&[0.0, 600.0, 1200.0], &[600.0, 600.0, 600.0], 1000.0);
        assert!(!changed);

        // Sub-pixel jitter from rounding does not count as a resize.
        let jitter =
            tracker.sync_layout(&[0.2, 600.1, 1200.0], &[600.0, 600.3, 600.0], 1000.2);
        assert!(!jitter);
    }

    #[test]
    fn empty_layout_never_activates() {
        let mut tracker = ViewportTracker::new();
        assert_eq!(tracker.observe(0.0), None);
        assert_eq!(tracker.active(), None);
    }
}
