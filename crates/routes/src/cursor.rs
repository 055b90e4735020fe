use foundation::Coordinate;

use crate::LocationGroup;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Progress {
    /// 1-based position, 0 for an empty route.
    pub current: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Position along one route. Advancing past the last point stays there.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCursor {
    location_id: String,
    points: Vec<Coordinate>,
    index: usize,
}

impl RouteCursor {
    pub fn new(group: &LocationGroup) -> Self {
        Self {
            location_id: group.location_id.clone(),
            points: group.coordinates(),
            index: 0,
        }
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<Coordinate> {
        self.points.get(self.index).copied()
    }

    pub fn is_finished(&self) -> bool {
        self.index + 1 >= self.points.len()
    }

    /// Moves forward by `steps`, clamped to the last point.
    ///
    /// Returns `true` if the index changed.
    pub fn advance(&mut self, steps: usize) -> bool {
        let last = self.points.len().saturating_sub(1);
        let next = self.index.saturating_add(steps).min(last);
        let moved = next != self.index;
        self.index = next;
        moved
    }

    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.points.len().saturating_sub(1));
    }

    pub fn progress(&self) -> Progress {
        let total = self.points.len();
        let current = (self.index + 1).min(total);
        let percentage = if total > 0 {
            current as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Progress {
            current,
            total,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RouteCursor;
    use crate::{LocationData, LocationGroup};
    use foundation::Coordinate;

    fn group(n: usize) -> LocationGroup {
        LocationGroup {
            location_id: "r".to_string(),
            locations: (0..n)
                .map(|i| LocationData {
                    latitude: 35.0 + i as f64 * 0.001,
                    longitude: 139.0,
                    timestamp: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn advance_clamps_at_last_point() {
        let mut c = RouteCursor::new(&group(3));
        assert!(c.advance(1));
        assert!(c.advance(5));
        assert_eq!(c.index(), 2);
        assert!(!c.advance(1));
        assert!(c.is_finished());
        assert_eq!(c.current(), Some(Coordinate::new(35.002, 139.0)));
    }

    #[test]
    fn progress_counts_from_one() {
        let mut c = RouteCursor::new(&group(4));
        assert_eq!(c.progress().current, 1);
        c.seek(99);
        let p = c.progress();
        assert_eq!((p.current, p.total), (4, 4));
        assert_eq!(p.percentage, 100.0);
    }

    #[test]
    fn empty_route_has_no_current_point() {
        let mut c = RouteCursor::new(&group(0));
        assert_eq!(c.current(), None);
        assert!(!c.advance(1));
        assert_eq!(c.progress().percentage, 0.0);
    }
}
