/// Edge-of-content trigger for infinite scroll.
///
/// Tracks the visibility of the sentinel region below the gallery columns and
/// reports the moment it transitions from off-screen to on-screen. The
/// trigger itself is a pure state machine; the GTK side feeds it visibility
/// fractions derived from the scroll adjustment and is responsible for
/// gating concurrent fetches (see `gallery::paging`).
#[derive(Debug, Clone)]
pub struct EdgeTrigger {
    /// Visible fraction of the sentinel required to count as "in view".
    threshold: f64,
    in_view: bool,
}

/// Reference threshold: fire once a tenth of the sentinel is visible.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

impl EdgeTrigger {
    /// Creates a trigger with the given visibility threshold, clamped to
    /// (0, 1]. A threshold of zero would fire on a degenerate zero-overlap
    /// "visibility" report, so the lower bound stays strictly positive.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(f64::EPSILON, 1.0),
            in_view: false,
        }
    }

    /// Feeds the current visible fraction of the sentinel (0.0..=1.0).
    ///
    /// Returns `true` exactly once per transition from below-threshold to
    /// at-or-above-threshold. Staying in view reports `false`; the sentinel
    /// must leave view (or the trigger must be `reset`) before it can fire
    /// again.
    pub fn update(&mut self, visible_fraction: f64) -> bool {
        let now_in_view = visible_fraction >= self.threshold;
        let fired = now_in_view && !self.in_view;
        self.in_view = now_in_view;
        fired
    }

    /// Rearms the trigger, e.g. after content grew below the sentinel or the
    /// observer was rewired to a new callback.
    pub fn reset(&mut self) {
        self.in_view = false;
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }
}

impl Default for EdgeTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_on_enter() {
        let mut trigger = EdgeTrigger::default();

        assert!(!trigger.update(0.0));
        assert!(trigger.update(0.5));
        // Still visible: no refire.
        assert!(!trigger.update(0.8));
        assert!(!trigger.update(1.0));
    }

    #[test]
    fn test_refires_after_leaving_view() {
        let mut trigger = EdgeTrigger::default();

        assert!(trigger.update(0.2));
        assert!(!trigger.update(0.05));
        assert!(trigger.update(0.2));
    }

    #[test]
    fn test_threshold_boundary() {
        let mut trigger = EdgeTrigger::new(0.1);

        assert!(!trigger.update(0.09));
        assert!(trigger.update(0.1));
    }

    #[test]
    fn test_reset_rearms() {
        let mut trigger = EdgeTrigger::default();

        assert!(trigger.update(1.0));
        assert!(!trigger.update(1.0));
        trigger.reset();
        assert!(trigger.update(1.0));
    }

    #[test]
    fn test_zero_threshold_does_not_fire_on_zero_visibility() {
        let mut trigger = EdgeTrigger::new(0.0);
        assert!(!trigger.update(0.0));
        assert!(trigger.update(0.5));
    }
}
