use crate::models::CategoryFilter;

/// Decision returned by [`Pager::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDecision {
    /// Issue a fetch for `page`; report back with `generation`.
    Fetch { page: u32, generation: u64 },
    /// A fetch is already in flight.
    SkipBusy,
    /// A concrete category filter is active; filtered views are treated as
    /// complete result sets and never paginate.
    SkipFiltered,
}

/// Serializes page fetches for the gallery.
///
/// Owns the busy flag and a generation counter. The busy flag guarantees at
/// most one fetch in flight; the generation lets results that arrive after a
/// reload or filter change be discarded instead of committed over newer
/// state. All access happens on the UI thread.
#[derive(Debug, Default)]
pub struct Pager {
    busy: bool,
    generation: u64,
    next_page: u32,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the next page fetch.
    ///
    /// Grants the fetch only when idle and unfiltered; the caller must
    /// eventually call [`Pager::complete`] with the returned generation on
    /// every completion path, success or failure.
    pub fn request(&mut self, filter: &CategoryFilter) -> FetchDecision {
        if self.busy {
            return FetchDecision::SkipBusy;
        }
        if !matches!(filter, CategoryFilter::All) {
            return FetchDecision::SkipFiltered;
        }

        self.busy = true;
        FetchDecision::Fetch {
            page: self.next_page,
            generation: self.generation,
        }
    }

    /// Marks a fetch as finished.
    ///
    /// Returns `true` when the result belongs to the current generation and
    /// may be committed; on `true` with `advance`, the page cursor moves
    /// forward. A stale result (issued before an `invalidate`) returns
    /// `false` and must be dropped by the caller.
    pub fn complete(&mut self, generation: u64, advance: bool) -> bool {
        if generation != self.generation {
            // Stale completion: the in-flight flag was already cleared by
            // invalidate(), nothing else to unwind.
            return false;
        }

        self.busy = false;
        if advance {
            self.next_page += 1;
        }
        true
    }

    /// Invalidates all in-flight fetches and rewinds to the first page.
    /// Used on reload and when the active source changes.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.busy = false;
        self.next_page = 0;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_grants_fetch_when_idle() {
        let mut pager = Pager::new();
        assert_eq!(
            pager.request(&CategoryFilter::All),
            FetchDecision::Fetch { page: 0, generation: 0 }
        );
        assert!(pager.is_busy());
    }

    #[test]
    fn test_busy_flag_blocks_overlapping_fetch() {
        let mut pager = Pager::new();
        let decision = pager.request(&CategoryFilter::All);
        let FetchDecision::Fetch { generation, .. } = decision else {
            panic!("expected fetch grant");
        };

        // Sentinel re-entering view while the first fetch is in flight.
        assert_eq!(pager.request(&CategoryFilter::All), FetchDecision::SkipBusy);

        assert!(pager.complete(generation, true));
        assert_eq!(
            pager.request(&CategoryFilter::All),
            FetchDecision::Fetch { page: 1, generation: 0 }
        );
    }

    #[test]
    fn test_filter_suppresses_pagination() {
        let mut pager = Pager::new();
        let filter = CategoryFilter::Only(Category::Branding);
        assert_eq!(pager.request(&filter), FetchDecision::SkipFiltered);
        assert!(!pager.is_busy());
    }

    #[test]
    fn test_failure_clears_busy_without_advancing() {
        let mut pager = Pager::new();
        let FetchDecision::Fetch { generation, page } = pager.request(&CategoryFilter::All) else {
            panic!("expected fetch grant");
        };
        assert_eq!(page, 0);

        assert!(pager.complete(generation, false));
        assert!(!pager.is_busy());
        assert_eq!(pager.next_page(), 0);
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut pager = Pager::new();
        let FetchDecision::Fetch { generation, .. } = pager.request(&CategoryFilter::All) else {
            panic!("expected fetch grant");
        };

        pager.invalidate();
        assert!(!pager.complete(generation, true));
        assert_eq!(pager.next_page(), 0);

        // The pager is usable again at the new generation.
        assert_eq!(
            pager.request(&CategoryFilter::All),
            FetchDecision::Fetch { page: 0, generation: 1 }
        );
    }
}
