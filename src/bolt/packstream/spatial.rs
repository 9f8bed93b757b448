//! Spatial values.

use std::fmt;

/// A point in a coordinate reference system.
///
/// Written as a 2D structure when `z` is `None`, as 3D otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Spatial Reference System Identifier
    pub srid: i32,
    /// X coordinate (longitude)
    pub x: f64,
    /// Y coordinate (latitude)
    pub y: f64,
    /// Z coordinate (height)
    pub z: Option<f64>,
}

impl Point {
    /// Create a 2D point.
    pub fn new_2d(srid: i32, x: f64, y: f64) -> Self {
        Self { srid, x, y, z: None }
    }

    /// Create a 3D point.
    pub fn new_3d(srid: i32, x: f64, y: f64, z: f64) -> Self {
        Self {
            srid,
            x,
            y,
            z: Some(z),
        }
    }

    /// Whether the point has a z coordinate.
    pub fn is_3d(&self) -> bool {
        self.z.is_some()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.z {
            Some(z) => write!(f, "point({{srid: {}, x: {}, y: {}, z: {}}})", self.srid, self.x, self.y, z),
            None => write!(f, "point({{srid: {}, x: {}, y: {}}})", self.srid, self.x, self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_dimensions() {
        assert!(!Point::new_2d(4326, 1.5, 2.5).is_3d());
        assert!(Point::new_3d(4979, 1.0, 2.0, 3.0).is_3d());
    }

    #[test]
    fn test_point_display() {
        assert_eq!(
            Point::new_2d(7203, 1.0, 2.0).to_string(),
            "point({srid: 7203, x: 1, y: 2})"
        );
    }
}
