use foundation::{Coordinate, CoordinateError};
use tracing::info;

use crate::compositor::{CompositeError, PanoramaCompositor};
use crate::fetcher::ImageryFetcher;
use crate::layout::TileLayout;
use crate::texture::{MappingKind, PanoramaTexture};

/// Hard failures of a panorama load. Provider failures never show up here;
/// they are already placeholders by the time tiles reach the compositor.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    InvalidCoordinate(CoordinateError),
    Composite(CompositeError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::InvalidCoordinate(err) => write!(f, "invalid coordinate: {err}"),
            LoadError::Composite(err) => write!(f, "compositing failed: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::InvalidCoordinate(err) => Some(err),
            LoadError::Composite(err) => Some(err),
        }
    }
}

impl From<CoordinateError> for LoadError {
    fn from(err: CoordinateError) -> Self {
        LoadError::InvalidCoordinate(err)
    }
}

impl From<CompositeError> for LoadError {
    fn from(err: CompositeError) -> Self {
        LoadError::Composite(err)
    }
}

/// Coordinate in, texture out: fetch every tile of a layout, then stitch.
#[derive(Clone)]
pub struct PanoramaPipeline {
    fetcher: ImageryFetcher,
    compositor: PanoramaCompositor,
    layout: TileLayout,
}

impl PanoramaPipeline {
    /// Pipeline using the mapping's default layout.
    pub fn new(fetcher: ImageryFetcher, mapping: MappingKind) -> Self {
        Self {
            fetcher,
            compositor: PanoramaCompositor::new(mapping),
            layout: mapping.default_layout(),
        }
    }

    pub fn with_layout(mut self, layout: TileLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_compositor(mut self, compositor: PanoramaCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    pub fn compositor(&self) -> &PanoramaCompositor {
        &self.compositor
    }

    pub async fn load(
        &self,
        coordinate: Coordinate,
        credential: Option<&str>,
    ) -> Result<PanoramaTexture, LoadError> {
        coordinate.validate()?;
        let tiles = self
            .fetcher
            .fetch_layout(coordinate, self.layout, credential)
            .await;
        let live = tiles.iter().filter(|t| t.source_is_live).count();
        let texture = self.compositor.composite(coordinate, &tiles)?;
        info!(
            %coordinate,
            tiles = tiles.len(),
            live,
            width = texture.width(),
            height = texture.height(),
            "panorama composited"
        );
        Ok(texture)
    }
}
