/// How many fixed-heading tiles cover the full 360°.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TileLayout {
    /// 0/90/180/270, 90° field of view, level pitch.
    Four,
    /// Every 45°, 45° field of view, tilted down to reduce ground distortion.
    Eight,
}

/// One tile's capture parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileSpec {
    pub heading: u16,
    pub fov_deg: f64,
    pub pitch_deg: f64,
}

pub const EIGHT_TILE_PITCH_DEG: f64 = -10.0;

impl TileLayout {
    pub fn count(self) -> u16 {
        match self {
            TileLayout::Four => 4,
            TileLayout::Eight => 8,
        }
    }

    pub fn fov_deg(self) -> f64 {
        360.0 / self.count() as f64
    }

    pub fn pitch_deg(self) -> f64 {
        match self {
            TileLayout::Four => 0.0,
            TileLayout::Eight => EIGHT_TILE_PITCH_DEG,
        }
    }

    /// Tiles in ascending heading order starting at 0°.
    pub fn tiles(self) -> Vec<TileSpec> {
        let step = 360 / self.count();
        (0..self.count())
            .map(|i| TileSpec {
                heading: i * step,
                fov_deg: self.fov_deg(),
                pitch_deg: self.pitch_deg(),
            })
            .collect()
    }

    /// Pitch used when a caller asks for an arbitrary field of view: narrow
    /// tiles get the eight-tile downward tilt.
    pub fn pitch_for_fov(fov_deg: f64) -> f64 {
        if fov_deg <= TileLayout::Eight.fov_deg() {
            EIGHT_TILE_PITCH_DEG
        } else {
            0.0
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "four" => Some(TileLayout::Four),
            "8" | "eight" => Some(TileLayout::Eight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TileLayout;

    #[test]
    fn four_tiles_cover_360_at_level_pitch() {
        let tiles = TileLayout::Four.tiles();
        let headings: Vec<u16> = tiles.iter().map(|t| t.heading).collect();
        assert_eq!(headings, vec![0, 90, 180, 270]);
        assert!(tiles.iter().all(|t| t.fov_deg == 90.0 && t.pitch_deg == 0.0));
    }

    #[test]
    fn eight_tiles_tilt_down() {
        let tiles = TileLayout::Eight.tiles();
        assert_eq!(tiles.len(), 8);
        assert_eq!(tiles[7].heading, 315);
        assert!(tiles.iter().all(|t| t.fov_deg == 45.0 && t.pitch_deg == -10.0));
    }

    #[test]
    fn pitch_follows_fov() {
        assert_eq!(TileLayout::pitch_for_fov(45.0), -10.0);
        assert_eq!(TileLayout::pitch_for_fov(90.0), 0.0);
        assert_eq!(TileLayout::parse(" Eight "), Some(TileLayout::Eight));
        assert_eq!(TileLayout::parse("6"), None);
    }
}
