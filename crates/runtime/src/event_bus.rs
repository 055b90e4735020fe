use crate::frame::Frame;

/// What happened during a frame. Kept coarse: the message carries detail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    Crossing,
    Milestone,
    RouteAdvanced,
    PanoramaRequested,
    PanoramaReady,
    PanoramaFailed,
    TrackingLost,
    Reset,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Crossing => "crossing",
            EventKind::Milestone => "milestone",
            EventKind::RouteAdvanced => "route_advanced",
            EventKind::PanoramaRequested => "panorama_requested",
            EventKind::PanoramaReady => "panorama_ready",
            EventKind::PanoramaFailed => "panorama_failed",
            EventKind::TrackingLost => "tracking_lost",
            EventKind::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Per-session event log, drained by whatever shell displays status.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind};
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.emit(Frame::fixed(2, 0.1), EventKind::Crossing, "total=1");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.count(EventKind::Crossing), 1);
        assert_eq!(bus.count(EventKind::Milestone), 0);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Frame::fixed(0, 1.0), EventKind::Reset, "");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind.as_str(), "reset");
        assert!(bus.events().is_empty());
    }
}
