//! Per-frame wiring of one immersive session: controllers in, panorama out.

use foundation::Coordinate;
use routes::{preset_for_count, RouteCursor, CROSSINGS_PER_PRESET};
use runtime::metrics::names;
use runtime::{EventBus, EventKind, Frame, Metrics};
use streaming::{Completion, LoadState, PanoramaPresenter, PanoramaView, EMPTY_PATH_MESSAGE};
use tracing::{debug, info};
use xr::{
    sample, CrossingConfig, CrossingDetector, CrossingOutcome, MilestoneTracker, ReferenceSpace,
    XrFrame, XrSession,
};

/// What one frame did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickReport {
    pub crossing: CrossingOutcome,
    pub milestone: Option<u32>,
    pub route_advanced: bool,
    pub target: Option<Coordinate>,
}

/// One detector, one presenter and the route being walked.
///
/// With a route, every counted crossing steps one point along it. Without
/// one, the location rotates through the presets every ten crossings.
pub struct ViewerSession {
    detector: CrossingDetector,
    milestones: MilestoneTracker,
    presenter: PanoramaPresenter,
    route: Option<RouteCursor>,
    credential: Option<String>,
    frame: Frame,
    both_tracked: bool,
    /// Coordinate whose load last failed; not retried until the target moves.
    failed_at: Option<Coordinate>,
    bus: EventBus,
    metrics: Metrics,
}

impl ViewerSession {
    pub fn new(
        presenter: PanoramaPresenter,
        crossing: CrossingConfig,
        credential: Option<String>,
    ) -> Self {
        Self {
            detector: CrossingDetector::new(crossing),
            milestones: MilestoneTracker::new(CROSSINGS_PER_PRESET),
            presenter,
            route: None,
            credential,
            frame: Frame::fixed(0, 0.0),
            both_tracked: false,
            failed_at: None,
            bus: EventBus::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn with_route(mut self, route: RouteCursor) -> Self {
        self.route = Some(route);
        self
    }

    pub fn detector(&self) -> &CrossingDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut CrossingDetector {
        &mut self.detector
    }

    pub fn route(&self) -> Option<&RouteCursor> {
        self.route.as_ref()
    }

    pub fn view(&self) -> &PanoramaView {
        self.presenter.view()
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Where the view should be: the current route point, or the preset for
    /// the running total when no route is loaded.
    pub fn target(&self) -> Option<Coordinate> {
        match &self.route {
            Some(cursor) => cursor.current(),
            None => Some(preset_for_count(self.detector.total()).coordinate),
        }
    }

    pub fn tick<S, F>(
        &mut self,
        frame: Frame,
        session: Option<&S>,
        xr_frame: Option<&F>,
        reference: Option<ReferenceSpace>,
    ) -> TickReport
    where
        S: XrSession + ?Sized,
        F: XrFrame + ?Sized,
    {
        self.frame = frame;
        let pair = sample(session, xr_frame, reference);

        match pair.tracked_count() {
            2 => self.both_tracked = true,
            n => {
                self.metrics.inc(if n == 1 {
                    names::FRAMES_ONE_HAND
                } else {
                    names::FRAMES_NO_HANDS
                });
                if std::mem::take(&mut self.both_tracked) {
                    self.bus
                        .emit(frame, EventKind::TrackingLost, format!("{n} hand(s) tracked"));
                }
            }
        }

        let crossing = self.detector.update(&pair, frame.time);
        let mut route_advanced = false;
        let mut milestone = None;

        if crossing.occurred {
            self.metrics.inc(names::CROSSINGS);
            self.metrics
                .record(names::CROSSING_GAP_MM, (crossing.y_difference.abs() * 1000.0) as i64);
            let hand = crossing
                .triggering_hand
                .map(|h| h.to_string())
                .unwrap_or_default();
            self.bus.emit(
                frame,
                EventKind::Crossing,
                format!("total {} ({hand})", crossing.total),
            );

            if let Some(cursor) = self.route.as_mut() {
                route_advanced = cursor.advance(1);
                if route_advanced {
                    let progress = cursor.progress();
                    self.metrics
                        .set_gauge(names::ROUTE_INDEX, cursor.index() as i64);
                    self.bus.emit(
                        frame,
                        EventKind::RouteAdvanced,
                        format!("{}/{}", progress.current, progress.total),
                    );
                }
            }

            milestone = self.milestones.observe(crossing.total);
            if let Some(total) = milestone {
                self.metrics.inc(names::MILESTONES);
                let preset = preset_for_count(total);
                info!(total, preset = preset.name, "crossing milestone");
                self.bus
                    .emit(frame, EventKind::Milestone, format!("{total} crossings"));
            }
        }

        TickReport {
            crossing,
            milestone,
            route_advanced,
            target: self.target(),
        }
    }

    /// Brings the panorama in line with [`target`](Self::target). A no-op when
    /// the target is already bound.
    pub async fn sync_panorama(&mut self) -> &PanoramaView {
        let credential = self.credential.clone();
        let frame = self.frame;

        let Some(coordinate) = self.target() else {
            if self.presenter.view().error.as_deref() != Some(EMPTY_PATH_MESSAGE) {
                self.presenter.observe_path(&[], 0, credential.as_deref()).await;
                self.metrics.inc(names::PANORAMA_FAILED);
                self.bus
                    .emit(frame, EventKind::PanoramaFailed, EMPTY_PATH_MESSAGE);
            }
            return self.presenter.view();
        };

        if self.failed_at.is_some_and(|f| f.same_bits(&coordinate)) {
            return self.presenter.view();
        }
        self.failed_at = None;

        let Some(ticket) = self.presenter.begin(coordinate, credential.as_deref()) else {
            return self.presenter.view();
        };
        self.metrics.inc(names::PANORAMA_LOADS);
        self.bus
            .emit(frame, EventKind::PanoramaRequested, coordinate.to_string());

        let result = self
            .presenter
            .pipeline()
            .load(ticket.coordinate, ticket.credential.as_deref())
            .await;
        match &result {
            Ok(texture) if texture.is_from_live_source => self.metrics.inc(names::PANORAMA_LIVE),
            Ok(_) => self.metrics.inc(names::PANORAMA_PLACEHOLDER),
            Err(_) => self.metrics.inc(names::PANORAMA_FAILED),
        }

        if self.presenter.complete(ticket.request, result) == Completion::Stale {
            self.metrics.inc(names::PANORAMA_STALE);
            return self.presenter.view();
        }

        let view = self.presenter.view();
        match (view.state, view.error.as_deref()) {
            (LoadState::Failed, Some(err)) => {
                self.failed_at = Some(coordinate);
                self.bus.emit(frame, EventKind::PanoramaFailed, err)
            }
            _ => self
                .bus
                .emit(frame, EventKind::PanoramaReady, coordinate.to_string()),
        }
        debug!(%coordinate, state = ?self.presenter.view().state, "panorama synced");
        self.presenter.view()
    }

    /// Back to zero crossings and the start of the route.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.milestones.reset();
        if let Some(cursor) = self.route.as_mut() {
            cursor.seek(0);
        }
        self.both_tracked = false;
        self.failed_at = None;
        self.bus.emit(self.frame, EventKind::Reset, "session reset");
    }
}
