//! Deterministic stand-in imagery.
//!
//! Used whenever live imagery is unavailable: no credential, provider failure,
//! or nothing to composite. The same inputs always produce the same pixels so
//! tests and replays are stable.

use foundation::Coordinate;
use image::{Rgba, RgbaImage};

const CLOUD_COUNT: usize = 20;
const GRID_COLUMNS: u32 = 8;
const GRID_ROWS: u32 = 4;

/// Neutral grey-blue used for the flat fallback raster.
pub const FLAT_PLACEHOLDER_RGB: [u8; 3] = [0x5a, 0x6e, 0x82];

#[derive(Debug, Copy, Clone)]
struct Palette {
    primary: [u8; 3],
    secondary: [u8; 3],
}

/// North/east/south/west palettes, selected by the nearest quadrant.
fn palette_for_heading(heading: u16) -> Palette {
    let quadrant = ((heading as u32 % 360 + 45) % 360) / 90;
    match quadrant {
        0 => Palette {
            primary: [0xff, 0x6b, 0x6b],
            secondary: [0xff, 0xe6, 0x6d],
        },
        1 => Palette {
            primary: [0x4e, 0xcd, 0xc4],
            secondary: [0x45, 0xb7, 0xb8],
        },
        2 => Palette {
            primary: [0x45, 0xb7, 0xd1],
            secondary: [0x6c, 0x5c, 0xe7],
        },
        _ => Palette {
            primary: [0xa8, 0xe6, 0xcf],
            secondary: [0x88, 0xd8, 0xa3],
        },
    }
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

fn blend(px: &mut Rgba<u8>, rgb: [u8; 3], alpha: f32) {
    let [r, g, b] = lerp_rgb([px[0], px[1], px[2]], rgb, alpha);
    *px = Rgba([r, g, b, 255]);
}

/// Placeholder for one heading at one coordinate.
pub fn placeholder_image(
    coordinate: Coordinate,
    heading: u16,
    width: u32,
    height: u32,
) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let palette = palette_for_heading(heading);

    // Vertical gradient primary -> secondary -> primary.
    let mut img = RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / (height.max(2) - 1) as f32;
        let rgb = if t <= 0.5 {
            lerp_rgb(palette.primary, palette.secondary, t * 2.0)
        } else {
            lerp_rgb(palette.secondary, palette.primary, (t - 0.5) * 2.0)
        };
        Rgba([rgb[0], rgb[1], rgb[2], 255])
    });

    draw_clouds(&mut img, coordinate, heading);
    draw_grid(&mut img);
    draw_heading_arrow(&mut img, heading);
    img
}

/// Single-colour raster with no detail at all.
pub fn flat_placeholder(width: u32, height: u32) -> RgbaImage {
    let [r, g, b] = FLAT_PLACEHOLDER_RGB;
    RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([r, g, b, 255]))
}

fn draw_clouds(img: &mut RgbaImage, coordinate: Coordinate, heading: u16) {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&coordinate.to_le_bytes());
    hasher.update(&heading.to_le_bytes());
    let mut reader = hasher.finalize_xof();
    let mut seed = [0u8; CLOUD_COUNT * 6];
    reader.fill(&mut seed);

    let (w, h) = img.dimensions();
    let scale = w.min(h) as f32 / 512.0;
    for chunk in seed.chunks_exact(6) {
        let unit = |a: u8, b: u8| u16::from_le_bytes([a, b]) as f32 / u16::MAX as f32;
        let cx = unit(chunk[0], chunk[1]) * w as f32;
        // Upper 40% of the frame.
        let cy = unit(chunk[2], chunk[3]) * h as f32 * 0.4;
        let radius = (20.0 + unit(chunk[4], chunk[5]) * 30.0) * scale.max(0.05);
        fill_disc(img, cx, cy, radius, [255, 255, 255], 0.7);
    }
}

fn fill_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, rgb: [u8; 3], alpha: f32) {
    let (w, h) = img.dimensions();
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(w.saturating_sub(1));
    let y1 = ((cy + radius).ceil() as u32).min(h.saturating_sub(1));
    let r2 = radius * radius;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend(img.get_pixel_mut(x, y), rgb, alpha);
            }
        }
    }
}

fn draw_grid(img: &mut RgbaImage) {
    let (w, h) = img.dimensions();
    for i in 0..=GRID_COLUMNS {
        let x = ((w as u64 * i as u64) / GRID_COLUMNS as u64).min(w as u64 - 1) as u32;
        for y in 0..h {
            blend(img.get_pixel_mut(x, y), [255, 255, 255], 0.2);
        }
    }
    for i in 0..=GRID_ROWS {
        let y = ((h as u64 * i as u64) / GRID_ROWS as u64).min(h as u64 - 1) as u32;
        for x in 0..w {
            blend(img.get_pixel_mut(x, y), [255, 255, 255], 0.2);
        }
    }
}

/// Triangle pointing along `heading` (0 = up), centred slightly below middle.
fn draw_heading_arrow(img: &mut RgbaImage, heading: u16) {
    let (w, h) = img.dimensions();
    let size = w.min(h) as f32 * 0.12;
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0 + size * 0.5;
    let angle = (heading as f32).to_radians();
    let point = |a: f32, len: f32| (cx + a.sin() * len, cy - a.cos() * len);
    let tri = [
        point(angle, size),
        point(angle + 2.6, size * 0.6),
        point(angle - 2.6, size * 0.6),
    ];

    let edge = |(ax, ay): (f32, f32), (bx, by): (f32, f32), px: f32, py: f32| {
        (bx - ax) * (py - ay) - (by - ay) * (px - ax)
    };
    let x0 = tri.iter().map(|p| p.0).fold(f32::MAX, f32::min).max(0.0) as u32;
    let y0 = tri.iter().map(|p| p.1).fold(f32::MAX, f32::min).max(0.0) as u32;
    let x1 = (tri.iter().map(|p| p.0).fold(f32::MIN, f32::max).ceil() as u32).min(w - 1);
    let y1 = (tri.iter().map(|p| p.1).fold(f32::MIN, f32::max).ceil() as u32).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let e0 = edge(tri[0], tri[1], px, py);
            let e1 = edge(tri[1], tri[2], px, py);
            let e2 = edge(tri[2], tri[0], px, py);
            let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0)
                || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
            if inside {
                blend(img.get_pixel_mut(x, y), [255, 255, 255], 0.9);
            }
        }
    }
}
