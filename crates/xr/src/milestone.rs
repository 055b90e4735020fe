/// Turns a running crossing total into "count reached" signals.
///
/// `every = 1` fires on each crossing (route stepping), `every = 10` on each
/// tenth (preset switching). A total is reported at most once, so repeated
/// calls with an unchanged total stay quiet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MilestoneTracker {
    every: u32,
    last_reported: u32,
}

impl MilestoneTracker {
    /// `every` of 0 is treated as 1.
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            last_reported: 0,
        }
    }

    pub fn every(&self) -> u32 {
        self.every
    }

    /// Returns `Some(total)` when `total` is a new multiple of `every`.
    pub fn observe(&mut self, total: u32) -> Option<u32> {
        if total == 0 || total <= self.last_reported || total % self.every != 0 {
            return None;
        }
        self.last_reported = total;
        Some(total)
    }

    pub fn reset(&mut self) {
        self.last_reported = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::MilestoneTracker;

    #[test]
    fn every_crossing() {
        let mut m = MilestoneTracker::new(1);
        assert_eq!(m.observe(0), None);
        assert_eq!(m.observe(1), Some(1));
        assert_eq!(m.observe(1), None);
        assert_eq!(m.observe(2), Some(2));
    }

    #[test]
    fn every_tenth() {
        let mut m = MilestoneTracker::new(10);
        let hits: Vec<u32> = (0..=25).filter_map(|t| m.observe(t)).collect();
        assert_eq!(hits, vec![10, 20]);
    }

    #[test]
    fn reset_allows_counting_again() {
        let mut m = MilestoneTracker::new(0);
        assert_eq!(m.every(), 1);
        assert_eq!(m.observe(3), Some(3));
        m.reset();
        assert_eq!(m.observe(1), Some(1));
    }
}
