mod config;
mod server;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use foundation::Coordinate;
use imagery::{
    ImageryFetcher, MappingKind, PanoramaPipeline, PanoramaTexture, StreetViewProvider, TileLayout,
};
use routes::{
    parse_groups, HttpRouteSource, InMemoryRouteStore, LocationGroupsResponse, RouteCursor,
    RouteError, RouteSource, RouteStore,
};
use runtime::Frame;
use streaming::PanoramaPresenter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use xr::{parse_recording, ScriptedFrame, ScriptedSession};

use crate::config::ViewerConfig;
use crate::server::AppState;
use crate::session::ViewerSession;

#[derive(Parser, Debug)]
#[command(author, version, about = "Street-level 360° panorama viewer")]
struct Args {
    /// Imagery API key (overrides STREET_VIEW_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// How tiles are laid out in the final texture
    #[arg(long, value_enum, default_value_t = Mapping::Equirectangular)]
    mapping: Mapping,

    /// Override the mapping's default tile layout (four or eight)
    #[arg(long, value_parser = parse_layout)]
    layout: Option<TileLayout>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mapping {
    Equirectangular,
    Segments,
}

impl From<Mapping> for MappingKind {
    fn from(m: Mapping) -> Self {
        match m {
            Mapping::Equirectangular => MappingKind::Equirectangular,
            Mapping::Segments => MappingKind::DiscreteSegments,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one panorama and write it as PNG
    Panorama {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, default_value = "panorama.png")]
        out: PathBuf,
    },

    /// Replay recorded controller motion through a session
    Replay {
        /// JSON-lines recording of controller positions
        recording: PathBuf,

        /// Route to walk (fetched from ROUTES_URL unless --routes-file is given)
        #[arg(long)]
        route: Option<String>,

        /// Local copy of the route endpoint response
        #[arg(long)]
        routes_file: Option<PathBuf>,

        /// Write the final panorama here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List routes from ROUTES_URL
    Routes,

    /// Serve panoramas over HTTP
    Serve {
        /// Listen address (overrides VIEWER_ADDR)
        #[arg(long)]
        addr: Option<std::net::SocketAddr>,
    },
}

fn parse_layout(raw: &str) -> Result<TileLayout, String> {
    TileLayout::parse(raw).ok_or_else(|| format!("unknown layout: {raw}"))
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = ViewerConfig::from_env()?;
    if let Some(key) = args.api_key.clone() {
        config.api_key = Some(key);
    }
    let pipeline = build_pipeline(&config, args.mapping.into(), args.layout)?;

    match args.command {
        Command::Panorama { lat, lon, out } => {
            let texture = pipeline
                .load(Coordinate::new(lat, lon), config.api_key.as_deref())
                .await?;
            write_png(&texture, &out).await?;
        }
        Command::Replay {
            recording,
            route,
            routes_file,
            out,
        } => {
            let cursor = match route {
                Some(id) => Some(load_route(&config, routes_file.as_deref(), &id).await?),
                None => None,
            };
            replay(&config, pipeline, &recording, cursor, out.as_deref()).await?;
        }
        Command::Routes => {
            let store = InMemoryRouteStore::from_response(fetch_routes(&config).await?);
            for group in store.list() {
                println!("{}\t{} points", group.location_id, group.locations.len());
            }
        }
        Command::Serve { addr } => {
            let state = AppState {
                pipeline: Arc::new(pipeline),
                credential: config.api_key.as_deref().map(Arc::from),
            };
            server::serve(addr.unwrap_or(config.addr), state).await?;
        }
    }
    Ok(())
}

fn build_pipeline(
    config: &ViewerConfig,
    mapping: MappingKind,
    layout: Option<TileLayout>,
) -> Result<PanoramaPipeline, AnyError> {
    let provider = StreetViewProvider::new(config.imagery_base_url.clone(), config.imagery_timeout)?;
    let fetcher = ImageryFetcher::new(Arc::new(provider), config.tile_size);
    let pipeline = PanoramaPipeline::new(fetcher, mapping);
    Ok(match layout {
        Some(layout) => pipeline.with_layout(layout),
        None => pipeline,
    })
}

async fn fetch_routes(config: &ViewerConfig) -> Result<LocationGroupsResponse, AnyError> {
    let url = config
        .routes_url
        .as_deref()
        .ok_or("ROUTES_URL is not set")?;
    let source = HttpRouteSource::new(url, config.imagery_timeout)?;
    Ok(source.fetch_groups().await?)
}

async fn load_route(
    config: &ViewerConfig,
    file: Option<&std::path::Path>,
    id: &str,
) -> Result<RouteCursor, AnyError> {
    let groups = match file {
        Some(path) => parse_groups(&tokio::fs::read_to_string(path).await?)?,
        None => fetch_routes(config).await?,
    };
    let cursor = route_cursor(groups, id)?;
    info!(route = id, points = cursor.points().len(), "route loaded");
    Ok(cursor)
}

fn route_cursor(groups: LocationGroupsResponse, id: &str) -> Result<RouteCursor, RouteError> {
    let store = InMemoryRouteStore::from_response(groups);
    Ok(RouteCursor::new(&store.require(id)?))
}

async fn replay(
    config: &ViewerConfig,
    pipeline: PanoramaPipeline,
    recording: &std::path::Path,
    route: Option<RouteCursor>,
    out: Option<&std::path::Path>,
) -> Result<(), AnyError> {
    let samples = parse_recording(&tokio::fs::read_to_string(recording).await?)?;
    let mut session = ViewerSession::new(
        PanoramaPresenter::new(pipeline),
        config.crossing,
        config.api_key.clone(),
    );
    if let Some(route) = route {
        session = session.with_route(route);
    }
    session
        .detector_mut()
        .set_on_count(|total, hand| info!(total, %hand, "crossing counted"));

    let xr_session = ScriptedSession::two_controllers();
    let mut frame: Option<Frame> = None;
    for sample in &samples {
        let next = match frame {
            None => Frame::first_at(sample.time()),
            Some(prev) => prev.advance_to(sample.time()),
        };
        frame = Some(next);
        if sample.reset {
            session.reset();
        }
        let xr_frame = ScriptedFrame::from(sample);
        let report = session.tick(
            next,
            Some(&xr_session),
            Some(&xr_frame),
            Some(ScriptedSession::REFERENCE),
        );
        if report.route_advanced || report.milestone.is_some() {
            if let Some(target) = report.target {
                info!(%target, total = report.crossing.total, "moving panorama");
            }
        }
        let view = session.sync_panorama().await;
        if let Some(warning) = &view.warning {
            warn!("{warning}");
        }
    }

    for event in session.events().events() {
        println!("{:>6} {:<20} {}", event.frame_index, event.kind.as_str(), event.message);
    }
    let state = session.detector().state();
    println!(
        "frames={} total={} left={} right={}",
        samples.len(),
        state.total(),
        state.left_count,
        state.right_count
    );
    if let Some(cursor) = session.route() {
        let progress = cursor.progress();
        println!(
            "route={} point={}/{} ({:.0}%)",
            cursor.location_id(),
            progress.current,
            progress.total,
            progress.percentage
        );
    }
    for (name, value) in session.metrics().snapshot().counters {
        println!("{name}={value}");
    }

    if let (Some(out), Some(texture)) = (out, session.view().texture.clone()) {
        write_png(&texture, out).await?;
    }
    Ok(())
}

async fn write_png(texture: &PanoramaTexture, out: &std::path::Path) -> Result<(), AnyError> {
    let png = texture.encode_png()?;
    tokio::fs::write(out, png).await?;
    info!(
        path = %out.display(),
        width = texture.width(),
        height = texture.height(),
        live = texture.is_from_live_source,
        "panorama written"
    );
    Ok(())
}
