use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use imagery::{TileSize, DEFAULT_STREET_VIEW_URL, DEFAULT_TIMEOUT};
use xr::{CrossingConfig, DEFAULT_COOLDOWN_S, DEFAULT_MIN_SEPARATION};

pub const DEFAULT_ADDR: &str = "127.0.0.1:9200";

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidAddr(String),
    InvalidTileSize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidAddr(v) => write!(f, "invalid VIEWER_ADDR: {v}"),
            ConfigError::InvalidTileSize(v) => {
                write!(f, "invalid IMAGERY_TILE_SIZE (expected WIDTHxHEIGHT): {v}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the binary reads from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub api_key: Option<String>,
    pub imagery_base_url: String,
    pub tile_size: TileSize,
    pub imagery_timeout: Duration,
    pub routes_url: Option<String>,
    pub addr: SocketAddr,
    pub crossing: CrossingConfig,
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_raw = lookup("VIEWER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_raw.clone()))?;

        let tile_size = match lookup("IMAGERY_TILE_SIZE") {
            Some(raw) => parse_tile_size(&raw).ok_or(ConfigError::InvalidTileSize(raw))?,
            None => TileSize::default(),
        };

        let timeout_secs = parsed(&lookup, "IMAGERY_TIMEOUT_SECS", DEFAULT_TIMEOUT.as_secs());
        let cooldown_ms = parsed(&lookup, "CROSSING_COOLDOWN_MS", DEFAULT_COOLDOWN_S * 1000.0);
        let min_separation = parsed(&lookup, "CROSSING_MIN_SEPARATION", DEFAULT_MIN_SEPARATION);

        Ok(Self {
            api_key: lookup("STREET_VIEW_API_KEY").filter(|k| !k.trim().is_empty()),
            imagery_base_url: lookup("IMAGERY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STREET_VIEW_URL.to_string()),
            tile_size,
            imagery_timeout: Duration::from_secs(timeout_secs.max(1)),
            routes_url: lookup("ROUTES_URL").filter(|u| !u.trim().is_empty()),
            addr,
            crossing: CrossingConfig {
                cooldown_s: cooldown_ms.max(0.0) / 1000.0,
                min_separation: min_separation.max(0.0),
                ..CrossingConfig::default()
            },
        })
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `"640x480"` → 640×480. Zero-sized tiles are rejected.
pub fn parse_tile_size(raw: &str) -> Option<TileSize> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    (width > 0 && height > 0).then(|| TileSize::new(width, height))
}
