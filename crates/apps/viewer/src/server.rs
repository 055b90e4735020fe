use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use foundation::Coordinate;
use imagery::{PanoramaPipeline, TileLayout};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const LIVE_HEADER: &str = "x-panorama-live";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PanoramaPipeline>,
    pub credential: Option<Arc<str>>,
}

#[derive(Debug, Deserialize)]
pub struct PanoramaQuery {
    lat: f64,
    lon: f64,
    layout: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    Router::new()
        .route("/healthz", get(healthz))
        .route("/panorama", get(get_panorama))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("panorama server listening on http://{addr}");
    axum::serve(listener, router(state)).await
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_panorama(
    State(state): State<AppState>,
    Query(query): Query<PanoramaQuery>,
) -> Response {
    let pipeline = match query.layout.as_deref() {
        None => state.pipeline.as_ref().clone(),
        Some(raw) => match TileLayout::parse(raw) {
            Some(layout) => state.pipeline.as_ref().clone().with_layout(layout),
            None => {
                return (StatusCode::BAD_REQUEST, format!("unknown layout: {raw}")).into_response()
            }
        },
    };

    let coordinate = Coordinate::new(query.lat, query.lon);
    let texture = match pipeline.load(coordinate, state.credential.as_deref()).await {
        Ok(texture) => texture,
        Err(err) => {
            warn!(%coordinate, "panorama request rejected: {err}");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let live = texture.is_from_live_source;
    let png = match tokio::task::spawn_blocking(move || texture.encode_png()).await {
        Ok(Ok(png)) => png,
        Ok(Err(err)) => {
            error!("png encode failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "encode failed").into_response();
        }
        Err(err) => {
            error!("png encode task failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "encode failed").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        LIVE_HEADER,
        HeaderValue::from_static(if live { "true" } else { "false" }),
    );
    (StatusCode::OK, headers, Body::from(png)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{router, AppState, LIVE_HEADER};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use imagery::{
        ImageryFetcher, MappingKind, PanoramaPipeline, StreetViewProvider, TileSize,
        DEFAULT_STREET_VIEW_URL, DEFAULT_TIMEOUT,
    };
    use tower::ServiceExt;

    // Without a credential every tile is a placeholder; nothing leaves the process.
    fn state() -> AppState {
        let provider =
            StreetViewProvider::new(DEFAULT_STREET_VIEW_URL, DEFAULT_TIMEOUT).expect("client");
        let fetcher = ImageryFetcher::new(Arc::new(provider), TileSize::new(8, 8));
        AppState {
            pipeline: Arc::new(PanoramaPipeline::new(fetcher, MappingKind::DiscreteSegments)),
            credential: None,
        }
    }

    async fn get(uri: &str) -> axum::response::Response {
        router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let resp = get("/healthz").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.expect("body").to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn panorama_is_png_with_live_header() {
        let resp = get("/panorama?lat=35.6812&lon=139.7671").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).expect("content type"),
            "image/png"
        );
        assert_eq!(resp.headers().get(LIVE_HEADER).expect("live header"), "false");

        let body = resp.into_body().collect().await.expect("body").to_bytes();
        assert!(body.starts_with(b"\x89PNG"));
        let img = image_size(&body);
        assert_eq!(img, (8 * 4, 8));
    }

    #[tokio::test]
    async fn layout_override_changes_tile_count() {
        let resp = get("/panorama?lat=35&lon=139&layout=eight").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.expect("body").to_bytes();
        assert_eq!(image_size(&body), (8 * 8, 8));
    }

    #[tokio::test]
    async fn unknown_layout_is_bad_request() {
        let resp = get("/panorama?lat=35&lon=139&layout=nine").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_coordinate_is_bad_request() {
        let resp = get("/panorama?lat=123&lon=139").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // Width and height from the PNG IHDR chunk.
    fn image_size(png: &[u8]) -> (u32, u32) {
        let be = |b: &[u8]| u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        (be(&png[16..20]), be(&png[20..24]))
    }
}
