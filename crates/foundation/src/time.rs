/// Session time in seconds.
///
/// The origin is whatever the host uses (session start, frame clock); only
/// differences between two `Time`s are meaningful.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub fn from_millis(ms: f64) -> Self {
        Time(ms / 1000.0)
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }

    /// Seconds elapsed since `earlier`. Negative if the clock went backwards.
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    pub fn offset(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn millis_round_trip() {
        let t = Time::from_millis(1500.0);
        assert_eq!(t, Time(1.5));
        assert_eq!(t.as_millis(), 1500.0);
    }

    #[test]
    fn since_measures_difference() {
        let a = Time(2.0);
        let b = a.offset(0.25);
        assert_eq!(b.since(a), 0.25);
        assert_eq!(a.since(b), -0.25);
    }
}
