use std::collections::BTreeMap;

/// Well-known metric names recorded by the viewer.
pub mod names {
    pub const CROSSINGS: &str = "xr.crossings";
    pub const MILESTONES: &str = "xr.milestones";
    pub const FRAMES_ONE_HAND: &str = "xr.frames_one_hand";
    pub const FRAMES_NO_HANDS: &str = "xr.frames_no_hands";
    pub const CROSSING_GAP_MM: &str = "xr.crossing_gap_mm";
    pub const PANORAMA_LOADS: &str = "panorama.loads";
    pub const PANORAMA_LIVE: &str = "panorama.live";
    pub const PANORAMA_PLACEHOLDER: &str = "panorama.placeholder";
    pub const PANORAMA_STALE: &str = "panorama.stale_dropped";
    pub const PANORAMA_FAILED: &str = "panorama.failed";
    pub const ROUTE_INDEX: &str = "route.index";
}

/// Session metrics with stable (sorted) snapshot order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
    histograms: BTreeMap<&'static str, Histogram>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl Histogram {
    pub fn record(&mut self, value: i64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
    pub histograms: Vec<(&'static str, Histogram)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, name: &'static str) {
        *self.counters.entry(name).or_insert(0) += 1;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    pub fn record(&mut self, name: &'static str, value: i64) {
        self.histograms.entry(name).or_default().record(value);
    }

    pub fn histogram(&self, name: &str) -> Option<Histogram> {
        self.histograms.get(name).copied()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (*k, *v)).collect(),
            histograms: self.histograms.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Histogram, Metrics, names};

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc(names::CROSSINGS);
        m.inc(names::CROSSINGS);
        assert_eq!(m.counter(names::CROSSINGS), 2);
        assert_eq!(m.counter(names::MILESTONES), 0);
    }

    #[test]
    fn gauges_overwrite() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge(names::ROUTE_INDEX), None);
        m.set_gauge(names::ROUTE_INDEX, 3);
        m.set_gauge(names::ROUTE_INDEX, 4);
        assert_eq!(m.gauge(names::ROUTE_INDEX), Some(4));
    }

    #[test]
    fn histogram_tracks_min_max_mean() {
        let mut h = Histogram::default();
        assert_eq!(h.mean(), None);
        h.record(30);
        h.record(50);
        h.record(40);
        assert_eq!((h.count, h.min, h.max), (3, 30, 50));
        assert_eq!(h.mean(), Some(40.0));
    }

    #[test]
    fn snapshot_is_sorted_by_name() {
        let mut m = Metrics::new();
        m.inc(names::PANORAMA_LOADS);
        m.inc(names::CROSSINGS);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![(names::PANORAMA_LOADS, 1), (names::CROSSINGS, 1)]
        );
    }
}
