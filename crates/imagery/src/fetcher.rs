use std::sync::Arc;

use foundation::Coordinate;
use futures_util::future::join_all;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::{debug, warn};

use crate::layout::{TileLayout, TileSpec};
use crate::placeholder::placeholder_image;
use crate::provider::{ImageRequest, ImageryProvider, ProviderError};
use crate::texture::DirectionalImage;

/// Tile raster size requested from the provider and used for placeholders.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for TileSize {
    fn default() -> Self {
        Self::new(640, 640)
    }
}

/// `None` for an absent or whitespace-only credential.
pub fn usable_credential(credential: Option<&str>) -> Option<&str> {
    credential.map(str::trim).filter(|c| !c.is_empty())
}

/// Fetches fixed-heading stills, substituting placeholders on any failure.
///
/// Callers never see provider errors: a failed or skipped fetch comes back as
/// a placeholder with `source_is_live == false`.
#[derive(Clone)]
pub struct ImageryFetcher {
    provider: Arc<dyn ImageryProvider>,
    tile_size: TileSize,
}

impl ImageryFetcher {
    pub fn new(provider: Arc<dyn ImageryProvider>, tile_size: TileSize) -> Self {
        Self {
            provider,
            tile_size,
        }
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn placeholder(&self, coordinate: Coordinate, heading: u16) -> DirectionalImage {
        DirectionalImage {
            heading,
            pixels: placeholder_image(
                coordinate,
                heading,
                self.tile_size.width,
                self.tile_size.height,
            ),
            source_is_live: false,
        }
    }

    /// One still at `heading` with the given field of view. Pitch follows the
    /// field of view (see [`TileLayout::pitch_for_fov`]).
    pub async fn fetch_directional_image(
        &self,
        coordinate: Coordinate,
        heading: u16,
        fov_deg: f64,
        credential: Option<&str>,
    ) -> DirectionalImage {
        let spec = TileSpec {
            heading: heading % 360,
            fov_deg,
            pitch_deg: TileLayout::pitch_for_fov(fov_deg),
        };
        self.fetch_tile(coordinate, spec, credential).await
    }

    pub async fn fetch_tile(
        &self,
        coordinate: Coordinate,
        spec: TileSpec,
        credential: Option<&str>,
    ) -> DirectionalImage {
        let Some(credential) = usable_credential(credential) else {
            debug!(heading = spec.heading, "no credential; using placeholder");
            return self.placeholder(coordinate, spec.heading);
        };

        let request = ImageRequest {
            coordinate,
            heading: spec.heading,
            fov_deg: spec.fov_deg,
            pitch_deg: spec.pitch_deg,
            width: self.tile_size.width,
            height: self.tile_size.height,
            credential: credential.to_string(),
        };

        match self.fetch_live(&request).await {
            Ok(pixels) => DirectionalImage {
                heading: spec.heading,
                pixels,
                source_is_live: true,
            },
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    %coordinate,
                    heading = spec.heading,
                    "imagery fetch failed, using placeholder: {err}"
                );
                self.placeholder(coordinate, spec.heading)
            }
        }
    }

    async fn fetch_live(&self, request: &ImageRequest) -> Result<RgbaImage, ProviderError> {
        let bytes = self.provider.fetch(request).await?;
        let decoded = image::load_from_memory(&bytes).map_err(ProviderError::Decode)?;
        let mut pixels = decoded.to_rgba8();
        if pixels.dimensions() != (self.tile_size.width, self.tile_size.height) {
            pixels = imageops::resize(
                &pixels,
                self.tile_size.width,
                self.tile_size.height,
                FilterType::Triangle,
            );
        }
        Ok(pixels)
    }

    /// Every tile of `layout`, fetched concurrently, ascending by heading.
    pub async fn fetch_layout(
        &self,
        coordinate: Coordinate,
        layout: TileLayout,
        credential: Option<&str>,
    ) -> Vec<DirectionalImage> {
        let tiles = layout.tiles();
        join_all(
            tiles
                .into_iter()
                .map(|spec| self.fetch_tile(coordinate, spec, credential)),
        )
        .await
    }

    /// Arbitrary heading order; results come back sorted by heading.
    pub async fn fetch_headings(
        &self,
        coordinate: Coordinate,
        headings: &[u16],
        fov_deg: f64,
        credential: Option<&str>,
    ) -> Vec<DirectionalImage> {
        let mut images = join_all(
            headings
                .iter()
                .map(|&h| self.fetch_directional_image(coordinate, h, fov_deg, credential)),
        )
        .await;
        images.sort_by_key(|img| img.heading);
        images
    }
}
