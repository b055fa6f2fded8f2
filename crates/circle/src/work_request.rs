use rand::Rng;

/// Bookkeeping for the Work-Request Protocol (§4.4): whether this rank has an
/// outstanding request of its own.
///
/// Incoming `REQUEST_WORK` messages need no analogous queue here: the Worker
/// Loop services every pending message before it goes idle again, so a
/// `REQUEST_WORK` is always answered in the same iteration it arrives in.
#[derive(Debug)]
pub struct WorkRequestState {
    requesting: bool,
    requested_of: Option<usize>,
    round_robin_cursor: usize,
}

impl WorkRequestState {
    pub fn new(rank: usize, size: usize) -> Self {
        Self {
            requesting: false,
            requested_of: None,
            round_robin_cursor: if size == 0 { 0 } else { (rank + 1) % size },
        }
    }

    pub fn is_requesting(&self) -> bool {
        self.requesting
    }

    pub fn requested_of(&self) -> Option<usize> {
        self.requested_of
    }

    pub fn mark_requesting(&mut self, target: usize) {
        self.requesting = true;
        self.requested_of = Some(target);
    }

    pub fn clear_requesting(&mut self) {
        self.requesting = false;
        self.requested_of = None;
    }

    /// Chooses this rank's next steal target, per `split_equal`: random
    /// (default) or round-robin starting at `(self+1) mod N`. Never returns
    /// `rank` itself.
    pub fn choose_target(&mut self, rank: usize, size: usize, split_equal: bool) -> usize {
        assert!(size > 1, "choosing a steal target requires at least 2 ranks");
        if split_equal {
            loop {
                let candidate = self.round_robin_cursor;
                self.round_robin_cursor = (self.round_robin_cursor + 1) % size;
                if candidate != rank {
                    return candidate;
                }
            }
        } else {
            loop {
                let candidate = rand::thread_rng().gen_range(0..size);
                if candidate != rank {
                    return candidate;
                }
            }
        }
    }
}

/// How many items a loaded rank should give away in response to a
/// `REQUEST_WORK`: the oldest (bottom) `⌊k/2⌋`, or nothing if it holds at
/// most one item.
pub fn split_count(queue_size: usize) -> usize {
    if queue_size >= 2 {
        queue_size / 2
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_count_matches_reference_policy() {
        assert_eq!(split_count(0), 0);
        assert_eq!(split_count(1), 0);
        assert_eq!(split_count(2), 1);
        assert_eq!(split_count(9), 4);
        assert_eq!(split_count(10), 5);
    }

    #[test]
    fn round_robin_starts_downstream_of_self_and_skips_self() {
        let mut state = WorkRequestState::new(1, 4);
        assert_eq!(state.choose_target(1, 4, true), 2);
        assert_eq!(state.choose_target(1, 4, true), 3);
        assert_eq!(state.choose_target(1, 4, true), 0);
        assert_eq!(state.choose_target(1, 4, true), 2); // skips self (1), wraps
    }

    #[test]
    fn random_target_never_picks_self() {
        let mut state = WorkRequestState::new(0, 3);
        for _ in 0..50 {
            let target = state.choose_target(0, 3, false);
            assert_ne!(target, 0);
        }
    }

    #[test]
    fn requesting_flag_tracks_outstanding_request() {
        let mut state = WorkRequestState::new(0, 3);
        assert!(!state.is_requesting());
        state.mark_requesting(2);
        assert!(state.is_requesting());
        assert_eq!(state.requested_of(), Some(2));
        state.clear_requesting();
        assert!(!state.is_requesting());
        assert_eq!(state.requested_of(), None);
    }
}
