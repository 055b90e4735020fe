use std::io::Cursor;

use foundation::Coordinate;
use image::{GenericImageView, ImageFormat, RgbaImage, SubImage};

use crate::layout::TileLayout;

/// A single fixed-heading still image.
#[derive(Debug, Clone)]
pub struct DirectionalImage {
    /// Compass heading in degrees, 0–359.
    pub heading: u16,
    pub pixels: RgbaImage,
    /// `false` when `pixels` is a generated placeholder.
    pub source_is_live: bool,
}

impl DirectionalImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// How the display surface maps the texture onto its sphere.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MappingKind {
    /// One wide raster wrapped around a full sphere; tile seams are blended.
    Equirectangular,
    /// One sphere section per tile; tiles are kept unblended.
    DiscreteSegments,
}

impl MappingKind {
    pub fn default_layout(self) -> TileLayout {
        match self {
            MappingKind::Equirectangular => TileLayout::Eight,
            MappingKind::DiscreteSegments => TileLayout::Four,
        }
    }
}

/// Composited panorama handed to the display surface.
///
/// Never mutated after construction; a new coordinate gets a new texture.
#[derive(Debug, Clone)]
pub struct PanoramaTexture {
    pub pixels: RgbaImage,
    pub mapping: MappingKind,
    pub is_from_live_source: bool,
    pub coordinate: Coordinate,
    /// Number of source tiles laid out left to right (1 for a fallback raster).
    pub segment_count: u32,
}

impl PanoramaTexture {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn segment_width(&self) -> u32 {
        self.width() / self.segment_count.max(1)
    }

    /// Sub-view for sphere section `index`.
    pub fn segment(&self, index: u32) -> Option<SubImage<&RgbaImage>> {
        if index >= self.segment_count {
            return None;
        }
        let w = self.segment_width();
        Some(self.pixels.view(index * w, 0, w, self.height()))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::{MappingKind, PanoramaTexture};
    use crate::layout::TileLayout;
    use foundation::Coordinate;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn texture(segments: u32) -> PanoramaTexture {
        let mut pixels = RgbaImage::new(40, 10);
        for (x, _, px) in pixels.enumerate_pixels_mut() {
            *px = Rgba([(x / 10) as u8, 0, 0, 255]);
        }
        PanoramaTexture {
            pixels,
            mapping: MappingKind::DiscreteSegments,
            is_from_live_source: false,
            coordinate: Coordinate::new(1.0, 2.0),
            segment_count: segments,
        }
    }

    #[test]
    fn segment_views_follow_tile_order() {
        let t = texture(4);
        let third = t.segment(2).expect("segment");
        assert_eq!(third.dimensions(), (10, 10));
        assert_eq!(third.get_pixel(0, 0), Rgba([2, 0, 0, 255]));
        assert!(t.segment(4).is_none());
    }

    #[test]
    fn png_encoding_has_signature() {
        let png = texture(1).encode_png().expect("png");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn default_layouts_per_mapping() {
        assert_eq!(
            MappingKind::Equirectangular.default_layout(),
            TileLayout::Eight
        );
        assert_eq!(
            MappingKind::DiscreteSegments.default_layout(),
            TileLayout::Four
        );
    }
}
