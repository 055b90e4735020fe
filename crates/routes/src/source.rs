use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{info, warn};

use crate::{LocationGroupsResponse, RouteError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote list of routes.
pub trait RouteSource: Send + Sync {
    fn fetch_groups(&self) -> BoxFuture<'_, Result<LocationGroupsResponse, RouteError>>;
}

/// `GET {base}/locations`.
pub struct HttpRouteSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRouteSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RouteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RouteError::Transport)?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn locations_url(&self) -> String {
        format!("{}/locations", self.base_url.trim_end_matches('/'))
    }
}

impl RouteSource for HttpRouteSource {
    fn fetch_groups(&self) -> BoxFuture<'_, Result<LocationGroupsResponse, RouteError>> {
        Box::pin(async move {
            let url = self.locations_url();
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(RouteError::Transport)?;
            if !resp.status().is_success() {
                warn!(%url, status = resp.status().as_u16(), "route endpoint error");
                return Err(RouteError::Http(resp.status().as_u16()));
            }
            let body: LocationGroupsResponse =
                resp.json().await.map_err(RouteError::Transport)?;
            info!(groups = body.location_groups.len(), "fetched routes");
            Ok(body)
        })
    }
}
