//! Street-level imagery provider seam.
//!
//! The core only cares about "image request in, encoded image bytes or failure
//! out". `StreetViewProvider` is the HTTP implementation; tests plug in
//! in-memory providers.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use foundation::Coordinate;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const DEFAULT_STREET_VIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Semantic parameters of one still-image request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub coordinate: Coordinate,
    pub heading: u16,
    pub fov_deg: f64,
    pub pitch_deg: f64,
    pub width: u32,
    pub height: u32,
    pub credential: String,
}

impl ImageRequest {
    /// `"WxH"`.
    pub fn size_param(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug)]
pub enum ProviderError {
    /// Provider answered with a non-success status (quota, bad key, no imagery).
    Status(u16),
    Transport(Box<dyn std::error::Error + Send + Sync>),
    Decode(image::ImageError),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Status(code) => write!(f, "imagery provider returned HTTP {code}"),
            ProviderError::Transport(err) => write!(f, "imagery request failed: {err}"),
            ProviderError::Decode(err) => write!(f, "imagery body is not an image: {err}"),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Status(_) => None,
            ProviderError::Transport(err) => Some(err.as_ref()),
            ProviderError::Decode(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ProviderError::Status(status.as_u16()),
            None => ProviderError::Transport(Box::new(err)),
        }
    }
}

/// Source of encoded still images. One call, one attempt.
pub trait ImageryProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch<'a>(&'a self, request: &'a ImageRequest) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>>;
}

/// Street View Static API style provider.
pub struct StreetViewProvider {
    base_url: String,
    client: reqwest::Client,
}

impl StreetViewProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(Box::new(e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_params(request: &ImageRequest) -> Vec<(&'static str, String)> {
        vec![
            ("size", request.size_param()),
            ("location", request.coordinate.to_string()),
            ("heading", request.heading.to_string()),
            ("pitch", request.pitch_deg.to_string()),
            ("fov", request.fov_deg.to_string()),
            ("key", request.credential.clone()),
        ]
    }
}

impl ImageryProvider for StreetViewProvider {
    fn name(&self) -> &str {
        "street-view"
    }

    fn fetch<'a>(&'a self, request: &'a ImageRequest) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(&self.base_url)
                .query(&Self::query_params(request))
                .send()
                .await?
                .error_for_status()?;
            let bytes = resp.bytes().await?;
            Ok(bytes.to_vec())
        })
    }
}
