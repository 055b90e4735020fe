use foundation::time::Time;

/// Per-frame metadata handed to every per-frame update.
///
/// Immersive sessions report a timestamp per animation frame; desktop
/// previews and replays use a fixed step. Both end up here.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame (0 for the first frame).
    pub dt_s: f64,
    /// Session time at the start of the frame.
    pub time: Time,
}

impl Frame {
    /// Fixed-step frame: `time = index * dt_s`.
    pub fn fixed(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// First frame of a session driven by host timestamps.
    pub fn first_at(time: Time) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time,
        }
    }

    /// Next frame at a host-supplied timestamp. A timestamp earlier than the
    /// current one is treated as zero elapsed time.
    pub fn advance_to(self, time: Time) -> Self {
        let dt_s = time.since(self.time).max(0.0);
        Self {
            index: self.index + 1,
            dt_s,
            time: if dt_s > 0.0 { time } else { self.time },
        }
    }

    pub fn next_fixed(self) -> Self {
        Self::fixed(self.index + 1, self.dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn fixed_frame_time_is_deterministic() {
        let a = Frame::fixed(10, 1.0 / 60.0);
        assert_eq!(a, Frame::fixed(10, 1.0 / 60.0));
        assert_eq!(a.time, Time(10.0 / 60.0));
        assert_eq!(a.next_fixed().index, 11);
    }

    #[test]
    fn advance_to_tracks_host_timestamps() {
        let f0 = Frame::first_at(Time(5.0));
        let f1 = f0.advance_to(Time(5.5));
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt_s, 0.5);
        assert_eq!(f1.time, Time(5.5));
    }

    #[test]
    fn advance_to_ignores_clock_going_backwards() {
        let f1 = Frame::first_at(Time(2.0)).advance_to(Time(1.0));
        assert_eq!(f1.dt_s, 0.0);
        assert_eq!(f1.time, Time(2.0));
    }
}
