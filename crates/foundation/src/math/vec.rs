/// Position in a tracking reference space (meters, +Y up).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Signed height of `self` above `other`.
    pub fn height_above(self, other: Self) -> f64 {
        self.y - other.y
    }

    /// Absolute vertical gap between two positions, ignoring X/Z.
    pub fn vertical_gap(self, other: Self) -> f64 {
        self.height_above(other).abs()
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

#[cfg(test)]
mod tests {
    use super::Vec3;

    #[test]
    fn vertical_gap_ignores_horizontal_offset() {
        let left = Vec3::new(-0.3, 1.2, 0.5);
        let right = Vec3::new(0.3, 1.0, -0.4);
        assert!((left.height_above(right) - 0.2).abs() < 1e-12);
        assert!((right.vertical_gap(left) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn add_sub_length() {
        let a = Vec3::new(1.0, 2.0, 2.0);
        let b = Vec3::new(0.5, -2.0, 3.0);
        assert_eq!(a + b, Vec3::new(1.5, 0.0, 5.0));
        assert_eq!(a - b, Vec3::new(0.5, 4.0, -1.0));
        assert_eq!(a.length(), 3.0);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(Vec3::ZERO.is_finite());
        assert!(!Vec3::new(0.0, f64::NAN, 0.0).is_finite());
    }
}
