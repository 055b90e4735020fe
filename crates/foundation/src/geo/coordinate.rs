/// WGS84 latitude/longitude in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateError {
    NotFinite,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::NotFinite => write!(f, "coordinate is not finite"),
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude out of range [-90, 90]: {lat}")
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "longitude out of range [-180, 180]: {lon}")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl Coordinate {
    /// Unchecked constructor; use [`Coordinate::validate`] before handing the
    /// value to anything that talks to a provider.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let c = Self::new(latitude, longitude);
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Bit-for-bit equality. `0.0` and `-0.0` differ here, and so do two NaNs
    /// with different payloads; this is what load deduplication wants.
    pub fn same_bits(&self, other: &Coordinate) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }

    /// Stable bytes for hashing/seeding.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.latitude.to_le_bytes());
        out[8..].copy_from_slice(&self.longitude.to_le_bytes());
        out
    }
}

/// `"lat,lon"`, the form imagery providers take as a location parameter.
impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
