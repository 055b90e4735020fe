use foundation::Coordinate;
use image::{Rgba, RgbaImage};

use crate::placeholder::flat_placeholder;
use crate::texture::{DirectionalImage, MappingKind, PanoramaTexture};

pub const DEFAULT_FADE_PX: u32 = 20;
pub const FALLBACK_WIDTH: u32 = 1024;
pub const FALLBACK_HEIGHT: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// Headings must start at 0° and strictly increase.
    UnorderedHeadings { index: usize, heading: u16 },
    TileSizeMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

impl std::fmt::Display for CompositeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompositeError::UnorderedHeadings { index, heading } => write!(
                f,
                "tile {index} (heading {heading}) breaks ascending heading order from 0"
            ),
            CompositeError::TileSizeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "tile {index} is {}x{}, expected {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for CompositeError {}

/// Stitches directional stills left to right into one texture.
///
/// The mapping kind is fixed per compositor: equirectangular output gets its
/// internal seams blended, segmented output keeps tiles untouched so each
/// sphere section shows exactly one still.
#[derive(Debug, Clone)]
pub struct PanoramaCompositor {
    mapping: MappingKind,
    fade_px: u32,
    fallback_size: (u32, u32),
}

impl PanoramaCompositor {
    pub fn new(mapping: MappingKind) -> Self {
        Self {
            mapping,
            fade_px: DEFAULT_FADE_PX,
            fallback_size: (FALLBACK_WIDTH, FALLBACK_HEIGHT),
        }
    }

    pub fn with_fade_px(mut self, fade_px: u32) -> Self {
        self.fade_px = fade_px;
        self
    }

    pub fn with_fallback_size(mut self, width: u32, height: u32) -> Self {
        self.fallback_size = (width, height);
        self
    }

    pub fn mapping(&self) -> MappingKind {
        self.mapping
    }

    /// Flat texture used when there is nothing to stitch.
    pub fn fallback(&self, coordinate: Coordinate) -> PanoramaTexture {
        PanoramaTexture {
            pixels: flat_placeholder(self.fallback_size.0, self.fallback_size.1),
            mapping: self.mapping,
            is_from_live_source: false,
            coordinate,
            segment_count: 1,
        }
    }

    pub fn composite(
        &self,
        coordinate: Coordinate,
        images: &[DirectionalImage],
    ) -> Result<PanoramaTexture, CompositeError> {
        let Some(first) = images.first() else {
            return Ok(self.fallback(coordinate));
        };
        validate(images)?;

        let (tw, th) = (first.width(), first.height());
        let mut pixels = RgbaImage::new(tw * images.len() as u32, th);
        for (i, img) in images.iter().enumerate() {
            image::imageops::replace(&mut pixels, &img.pixels, (i as u32 * tw) as i64, 0);
        }

        if self.mapping == MappingKind::Equirectangular {
            let fade = self.fade_px.min(tw / 2);
            for i in 1..images.len() {
                blend_seam(&mut pixels, &images[i - 1].pixels, &images[i].pixels, i as u32 * tw, fade);
            }
        }

        Ok(PanoramaTexture {
            pixels,
            mapping: self.mapping,
            is_from_live_source: images.iter().all(|img| img.source_is_live),
            coordinate,
            segment_count: images.len() as u32,
        })
    }
}

fn validate(images: &[DirectionalImage]) -> Result<(), CompositeError> {
    let expected = images[0].pixels.dimensions();
    let mut prev: Option<u16> = None;
    for (index, img) in images.iter().enumerate() {
        let in_order = match prev {
            None => img.heading == 0,
            Some(p) => img.heading > p && img.heading < 360,
        };
        if !in_order {
            return Err(CompositeError::UnorderedHeadings {
                index,
                heading: img.heading,
            });
        }
        let found = img.pixels.dimensions();
        if found != expected {
            return Err(CompositeError::TileSizeMismatch {
                index,
                expected,
                found,
            });
        }
        prev = Some(img.heading);
    }
    Ok(())
}

fn mix(own: Rgba<u8>, other: Rgba<u8>, own_weight: f32) -> Rgba<u8> {
    let c = |a: u8, b: u8| (a as f32 * own_weight + b as f32 * (1.0 - own_weight)).round() as u8;
    Rgba([c(own[0], other[0]), c(own[1], other[1]), c(own[2], other[2]), 255])
}

/// Linear ramp on both sides of the seam at column `seam_x`.
///
/// Columns touching the seam are an even mix of both tiles' edge columns; the
/// neighbour's share falls off linearly over `fade` columns.
fn blend_seam(out: &mut RgbaImage, left: &RgbaImage, right: &RgbaImage, seam_x: u32, fade: u32) {
    if fade == 0 {
        return;
    }
    let (tw, th) = left.dimensions();
    for y in 0..th {
        let left_edge = *left.get_pixel(tw - 1, y);
        let right_edge = *right.get_pixel(0, y);
        for j in 0..fade {
            let own_weight = 0.5 + 0.5 * j as f32 / fade as f32;

            let lx = tw - 1 - j;
            out.put_pixel(seam_x - 1 - j, y, mix(*left.get_pixel(lx, y), right_edge, own_weight));

            out.put_pixel(seam_x + j, y, mix(*right.get_pixel(j, y), left_edge, own_weight));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeError, FALLBACK_HEIGHT, FALLBACK_WIDTH, PanoramaCompositor};
    use crate::texture::{DirectionalImage, MappingKind};
    use foundation::Coordinate;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    const HERE: Coordinate = Coordinate::new(35.0, 139.0);

    fn tile(heading: u16, rgb: [u8; 3], live: bool) -> DirectionalImage {
        DirectionalImage {
            heading,
            pixels: RgbaImage::from_pixel(40, 10, Rgba([rgb[0], rgb[1], rgb[2], 255])),
            source_is_live: live,
        }
    }

    fn four(live: [bool; 4]) -> Vec<DirectionalImage> {
        vec![
            tile(0, [200, 0, 0], live[0]),
            tile(90, [0, 200, 0], live[1]),
            tile(180, [0, 0, 200], live[2]),
            tile(270, [200, 200, 0], live[3]),
        ]
    }

    #[test]
    fn output_is_tiles_side_by_side() {
        for n in 1..=8u16 {
            let images: Vec<_> = (0..n).map(|i| tile(i * 45, [1, 2, 3], true)).collect();
            let tex = PanoramaCompositor::new(MappingKind::Equirectangular)
                .composite(HERE, &images)
                .expect("composite");
            assert_eq!(tex.width(), 40 * n as u32);
            assert_eq!(tex.height(), 10);
            assert_eq!(tex.segment_count, n as u32);
        }
    }

    #[test]
    fn equirectangular_blends_internal_seams_only() {
        let tex = PanoramaCompositor::new(MappingKind::Equirectangular)
            .with_fade_px(10)
            .composite(HERE, &four([true; 4]))
            .expect("composite");
        let px = |x| tex.pixels.get_pixel(x, 5).0;

        // Outer edges untouched.
        assert_eq!(px(0), [200, 0, 0, 255]);
        assert_eq!(px(159), [200, 200, 0, 255]);
        // Even mix right at the seam, on both sides.
        assert_eq!(px(39), [100, 100, 0, 255]);
        assert_eq!(px(40), [100, 100, 0, 255]);
        // Outside the fade band the tile is its own colour.
        assert_eq!(px(29), [200, 0, 0, 255]);
        assert_eq!(px(50), [0, 200, 0, 255]);
        // Inside the band the own colour dominates more with distance.
        assert!(px(35)[0] > px(38)[0]);
    }

    #[test]
    fn fade_is_clamped_to_half_a_tile() {
        let tex = PanoramaCompositor::new(MappingKind::Equirectangular)
            .with_fade_px(500)
            .composite(HERE, &four([true; 4]))
            .expect("composite");
        assert_eq!(tex.pixels.get_pixel(0, 0).0, [200, 0, 0, 255]);
    }

    #[test]
    fn segmented_mapping_keeps_tiles_unblended() {
        let tex = PanoramaCompositor::new(MappingKind::DiscreteSegments)
            .composite(HERE, &four([true; 4]))
            .expect("composite");
        assert_eq!(tex.pixels.get_pixel(39, 0).0, [200, 0, 0, 255]);
        assert_eq!(tex.pixels.get_pixel(40, 0).0, [0, 200, 0, 255]);
        assert_eq!(tex.mapping, MappingKind::DiscreteSegments);
    }

    #[test]
    fn live_only_when_every_tile_is_live() {
        let c = PanoramaCompositor::new(MappingKind::Equirectangular);
        assert!(c.composite(HERE, &four([true; 4])).unwrap().is_from_live_source);
        assert!(
            !c.composite(HERE, &four([true, true, false, true]))
                .unwrap()
                .is_from_live_source
        );
    }

    #[test]
    fn empty_input_falls_back_to_flat_raster() {
        let tex = PanoramaCompositor::new(MappingKind::Equirectangular)
            .composite(HERE, &[])
            .expect("fallback");
        assert_eq!((tex.width(), tex.height()), (FALLBACK_WIDTH, FALLBACK_HEIGHT));
        assert!(!tex.is_from_live_source);
        assert_eq!(tex.coordinate, HERE);
    }

    #[test]
    fn rejects_out_of_order_headings() {
        let mut images = four([true; 4]);
        images.swap(1, 2);
        let err = PanoramaCompositor::new(MappingKind::Equirectangular)
            .composite(HERE, &images)
            .unwrap_err();
        assert_eq!(err, CompositeError::UnorderedHeadings { index: 2, heading: 90 });

        let not_from_zero = vec![tile(90, [0, 0, 0], true)];
        assert!(
            PanoramaCompositor::new(MappingKind::Equirectangular)
                .composite(HERE, &not_from_zero)
                .is_err()
        );
    }

    #[test]
    fn rejects_mismatched_tile_sizes() {
        let mut images = four([true; 4]);
        images[3].pixels = RgbaImage::new(20, 10);
        let err = PanoramaCompositor::new(MappingKind::DiscreteSegments)
            .composite(HERE, &images)
            .unwrap_err();
        assert_eq!(
            err,
            CompositeError::TileSizeMismatch {
                index: 3,
                expected: (40, 10),
                found: (20, 10),
            }
        );
    }
}
