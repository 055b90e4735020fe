use std::sync::Arc;

use foundation::Coordinate;
use imagery::{LoadError, PanoramaPipeline, PanoramaTexture, usable_credential};
use tracing::{debug, warn};

use crate::load_state::LoadState;
use crate::request::Request;

/// Message shown when a load fails outright.
pub const LOAD_FAILED_MESSAGE: &str = "failed to load panorama";
/// Shown when a credential was supplied but imagery came back as placeholders.
pub const PLACEHOLDER_WARNING: &str = "street-level imagery unavailable; showing placeholder";
pub const EMPTY_PATH_MESSAGE: &str = "no route points available";

/// What the display surface renders.
#[derive(Debug, Clone, Default)]
pub struct PanoramaView {
    /// Always `Some` once any load has completed, successful or not.
    pub texture: Option<Arc<PanoramaTexture>>,
    pub loading: bool,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub state: LoadState,
}

/// A load the presenter has started and is waiting to hear back about.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub request: Request,
    pub coordinate: Coordinate,
    pub credential: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was started; the result was dropped.
    Stale,
}

/// Owns the "current coordinate → current texture" binding.
///
/// Loads may overlap; only the most recently started one may change the
/// view. Nothing is cancelled, stale results are just discarded.
pub struct PanoramaPresenter {
    pipeline: PanoramaPipeline,
    last_request: Request,
    in_flight: Option<Ticket>,
    loaded: Option<Coordinate>,
    view: PanoramaView,
}

pub fn clamp_path_index(len: usize, index: usize) -> Option<usize> {
    (len > 0).then(|| index.min(len - 1))
}

impl PanoramaPresenter {
    pub fn new(pipeline: PanoramaPipeline) -> Self {
        Self {
            pipeline,
            last_request: Request(0),
            in_flight: None,
            loaded: None,
            view: PanoramaView::default(),
        }
    }

    pub fn pipeline(&self) -> &PanoramaPipeline {
        &self.pipeline
    }

    pub fn view(&self) -> &PanoramaView {
        &self.view
    }

    pub fn bound_coordinate(&self) -> Option<Coordinate> {
        self.loaded
    }

    pub fn latest_request(&self) -> Option<&Ticket> {
        self.in_flight.as_ref()
    }

    /// Coordinate the view is heading towards: the in-flight one if any,
    /// otherwise the last one that loaded.
    fn target(&self) -> Option<Coordinate> {
        self.in_flight
            .as_ref()
            .map(|t| t.coordinate)
            .or(self.loaded)
    }

    /// Starts a load unless `coordinate` is already the target.
    pub fn begin(&mut self, coordinate: Coordinate, credential: Option<&str>) -> Option<Ticket> {
        if self.target().is_some_and(|t| t.same_bits(&coordinate)) {
            debug!(%coordinate, "panorama already bound or loading; skipping");
            return None;
        }

        self.last_request = self.last_request.next();
        let ticket = Ticket {
            request: self.last_request,
            coordinate,
            credential: credential.map(str::to_string),
        };
        if let Some(prev) = self.in_flight.replace(ticket.clone()) {
            debug!(superseded = prev.request.0, "newer panorama request supersedes pending one");
        }
        self.view.loading = true;
        self.view.error = None;
        self.view.state = LoadState::Loading;
        Some(ticket)
    }

    /// Applies the result of `request` if it is still the latest one.
    pub fn complete(
        &mut self,
        request: Request,
        result: Result<PanoramaTexture, LoadError>,
    ) -> Completion {
        let Some(ticket) = self.in_flight.take_if(|t| t.request == request) else {
            debug!(request = request.0, "dropping stale panorama result");
            return Completion::Stale;
        };

        self.view.loading = false;
        match result {
            Ok(texture) => {
                let had_credential = usable_credential(ticket.credential.as_deref()).is_some();
                self.view.warning = (!texture.is_from_live_source && had_credential)
                    .then(|| PLACEHOLDER_WARNING.to_string());
                if self.view.warning.is_some() {
                    warn!(coordinate = %ticket.coordinate, "{PLACEHOLDER_WARNING}");
                }
                self.view.texture = Some(Arc::new(texture));
                self.view.error = None;
                self.view.state = LoadState::Ready;
                self.loaded = Some(ticket.coordinate);
            }
            Err(err) => {
                warn!(coordinate = %ticket.coordinate, "panorama load failed: {err}");
                self.fail_with(ticket.coordinate, LOAD_FAILED_MESSAGE);
            }
        }
        Completion::Applied
    }

    /// Shows the fallback texture and unbinds, so the next observe of any
    /// coordinate loads again.
    fn fail_with(&mut self, coordinate: Coordinate, message: &str) {
        self.loaded = None;
        let fallback = self.pipeline.compositor().fallback(coordinate);
        self.view.texture = Some(Arc::new(fallback));
        self.view.error = Some(message.to_string());
        self.view.warning = None;
        self.view.loading = false;
        self.view.state = LoadState::Failed;
    }

    /// Load `coordinate` to completion unless it is already bound.
    pub async fn observe(&mut self, coordinate: Coordinate, credential: Option<&str>) -> &PanoramaView {
        if let Some(ticket) = self.begin(coordinate, credential) {
            let result = self
                .pipeline
                .load(ticket.coordinate, ticket.credential.as_deref())
                .await;
            self.complete(ticket.request, result);
        }
        &self.view
    }

    /// Same as [`observe`](Self::observe) for the point at `index` of `path`,
    /// with the index clamped to the last point.
    pub async fn observe_path(
        &mut self,
        path: &[Coordinate],
        index: usize,
        credential: Option<&str>,
    ) -> &PanoramaView {
        let Some(index) = clamp_path_index(path.len(), index) else {
            warn!("{EMPTY_PATH_MESSAGE}");
            self.in_flight = None;
            let at = self.loaded.unwrap_or_default();
            self.fail_with(at, EMPTY_PATH_MESSAGE);
            return &self.view;
        };
        self.observe(path[index], credential).await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{
        Completion, EMPTY_PATH_MESSAGE, LOAD_FAILED_MESSAGE, PLACEHOLDER_WARNING,
        PanoramaPresenter, clamp_path_index,
    };
    use crate::load_state::LoadState;
    use foundation::{Coordinate, CoordinateError};
    use imagery::{
        BoxFuture, ImageRequest, ImageryFetcher, ImageryProvider, LoadError, MappingKind,
        PanoramaPipeline, ProviderError, TileSize,
    };
    use image::{ImageFormat, Rgba, RgbaImage};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ImageryProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn fetch<'a>(
            &'a self,
            _request: &'a ImageRequest,
        ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    return Err(ProviderError::Status(429));
                }
                let mut buf = Vec::new();
                RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255]))
                    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                    .map_err(ProviderError::Decode)?;
                Ok(buf)
            })
        }
    }

    fn presenter(fail: bool) -> (PanoramaPresenter, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let fetcher = ImageryFetcher::new(provider.clone(), TileSize::new(8, 8));
        let pipeline = PanoramaPipeline::new(fetcher, MappingKind::DiscreteSegments);
        (PanoramaPresenter::new(pipeline), provider)
    }

    const A: Coordinate = Coordinate::new(35.6762, 139.6503);
    const B: Coordinate = Coordinate::new(35.3606, 138.7274);

    #[tokio::test]
    async fn repeated_observe_fetches_once() {
        let (mut p, provider) = presenter(false);
        p.observe(A, Some("key")).await;
        let after_first = provider.calls.load(Ordering::SeqCst);
        p.observe(A, Some("key")).await;
        assert_eq!(after_first, 4);
        assert_eq!(provider.calls.load(Ordering::SeqCst), after_first);

        let view = p.view();
        assert!(!view.loading);
        assert_eq!(view.state, LoadState::Ready);
        assert!(view.texture.as_ref().expect("texture").is_from_live_source);
        assert_eq!(p.bound_coordinate(), Some(A));
    }

    #[tokio::test]
    async fn stale_result_does_not_overwrite_newer_binding() {
        let (mut p, _provider) = presenter(false);
        let first = p.begin(A, Some("key")).expect("ticket a");
        let second = p.begin(B, Some("key")).expect("ticket b");
        assert!(p.view().loading);

        let tex_b = p.pipeline().load(B, Some("key")).await;
        assert_eq!(p.complete(second.request, tex_b), Completion::Applied);

        let tex_a = p.pipeline().load(A, Some("key")).await;
        assert_eq!(p.complete(first.request, tex_a), Completion::Stale);

        let bound = p.view().texture.as_ref().expect("texture").coordinate;
        assert_eq!(bound, B);
        assert_eq!(p.bound_coordinate(), Some(B));
    }

    #[tokio::test]
    async fn returning_to_loaded_coordinate_while_another_loads_restarts() {
        let (mut p, _provider) = presenter(false);
        p.observe(A, None).await;
        let to_b = p.begin(B, None).expect("b");
        let back_to_a = p.begin(A, None).expect("a again");
        assert!(back_to_a.request > to_b.request);
        assert_eq!(p.latest_request().map(|t| t.coordinate), Some(A));
    }

    #[tokio::test]
    async fn placeholder_with_credential_sets_warning() {
        let (mut p, _provider) = presenter(true);
        let view = p.observe(A, Some("key")).await;
        assert_eq!(view.warning.as_deref(), Some(PLACEHOLDER_WARNING));
        assert!(view.error.is_none());
        assert!(!view.texture.as_ref().expect("texture").is_from_live_source);
    }

    #[tokio::test]
    async fn no_credential_placeholder_is_silent() {
        let (mut p, provider) = presenter(false);
        let view = p.observe(A, None).await;
        assert!(view.warning.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn hard_failure_surfaces_error_and_still_has_texture() {
        let (mut p, _provider) = presenter(false);
        let view = p.observe(Coordinate::new(0.0, 200.0), Some("key")).await;
        assert_eq!(view.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(view.state, LoadState::Failed);
        assert!(view.texture.is_some());
        assert_eq!(p.bound_coordinate(), None);
    }

    #[tokio::test]
    async fn failed_coordinate_can_be_retried() {
        let (mut p, _provider) = presenter(false);
        let ticket = p.begin(A, None).expect("ticket");
        let err = LoadError::InvalidCoordinate(CoordinateError::NotFinite);
        p.complete(ticket.request, Err(err));
        assert!(p.begin(A, None).is_some());
    }

    #[tokio::test]
    async fn returning_after_a_failed_load_reloads() {
        let (mut p, _provider) = presenter(false);
        p.observe(A, None).await;
        let to_b = p.begin(B, None).expect("b");
        let err = LoadError::InvalidCoordinate(CoordinateError::NotFinite);
        p.complete(to_b.request, Err(err));
        assert_eq!(p.view().state, LoadState::Failed);
        assert_eq!(p.bound_coordinate(), None);

        let view = p.observe(A, None).await;
        assert_eq!(view.state, LoadState::Ready);
        assert!(view.error.is_none());
        assert_eq!(view.texture.as_ref().expect("texture").coordinate, A);
        assert_eq!(p.bound_coordinate(), Some(A));
    }

    #[tokio::test]
    async fn path_index_is_clamped() {
        let (mut p, _provider) = presenter(false);
        let path = [A, B];
        p.observe_path(&path, 7, None).await;
        assert_eq!(p.bound_coordinate(), Some(B));
    }

    #[tokio::test]
    async fn empty_path_is_an_error_with_texture() {
        let (mut p, _provider) = presenter(false);
        let view = p.observe_path(&[], 0, None).await;
        assert_eq!(view.error.as_deref(), Some(EMPTY_PATH_MESSAGE));
        assert!(view.texture.is_some());
    }

    #[test]
    fn clamp_helper() {
        assert_eq!(clamp_path_index(0, 3), None);
        assert_eq!(clamp_path_index(3, 1), Some(1));
        assert_eq!(clamp_path_index(3, 99), Some(2));
    }
}
