//! # Planar geometry types
//!
//! All positions are given in the local planar (UTM-like) frame, in meters.
//! Headings are in radians, 0 pointing north and increasing clockwise, so a
//! point `d` meters ahead along heading `h` is offset by `(sin(h)*d,
//! cos(h)*d)` in (easting, northing).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use util::maths::wrap_2pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A planar position with altitude, as reported by the GPS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Units: meters
    pub easting: f64,

    /// Units: meters
    pub northing: f64,

    /// Units: meters
    pub altitude: f64,
}

/// A point without an orientation, for example the hitch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    /// Units: meters
    pub easting: f64,

    /// Units: meters
    pub northing: f64,
}

/// An oriented reference point on the vehicle or implement (pivot axle,
/// steer axle, tool, tank).
///
/// Positions built with `Position3D::new` always have a heading in
/// [0, 2pi).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position3D {
    /// Units: meters
    pub easting: f64,

    /// Units: meters
    pub northing: f64,

    /// Units: radians, [0, 2pi)
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeoCoord {
    pub fn new(easting: f64, northing: f64, altitude: f64) -> Self {
        Self {
            easting,
            northing,
            altitude,
        }
    }

    /// The planar (easting, northing) part of the coordinate.
    pub fn en(&self) -> Vector2<f64> {
        Vector2::new(self.easting, self.northing)
    }

    /// Planar distance to another coordinate, altitude is ignored.
    pub fn distance_to(&self, other: &GeoCoord) -> f64 {
        (self.en() - other.en()).norm()
    }

    /// Squared planar distance to another coordinate.
    pub fn distance_sq_to(&self, other: &GeoCoord) -> f64 {
        (self.en() - other.en()).norm_squared()
    }

    /// Returns true if all components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.easting.is_finite() && self.northing.is_finite() && self.altitude.is_finite()
    }
}

impl Position2D {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    pub fn from_vector(en: Vector2<f64>) -> Self {
        Self::new(en[0], en[1])
    }

    pub fn en(&self) -> Vector2<f64> {
        Vector2::new(self.easting, self.northing)
    }
}

impl Position3D {
    /// Create a new position, wrapping the heading into [0, 2pi).
    pub fn new(easting: f64, northing: f64, heading: f64) -> Self {
        Self {
            easting,
            northing,
            heading: wrap_2pi(heading),
        }
    }

    pub fn from_vector(en: Vector2<f64>, heading: f64) -> Self {
        Self::new(en[0], en[1], heading)
    }

    pub fn en(&self) -> Vector2<f64> {
        Vector2::new(self.easting, self.northing)
    }

    /// Drop the heading.
    pub fn position_2d(&self) -> Position2D {
        Position2D::new(self.easting, self.northing)
    }
}

impl From<GeoCoord> for Position2D {
    fn from(coord: GeoCoord) -> Self {
        Position2D::new(coord.easting, coord.northing)
    }
}

impl From<Position3D> for Position2D {
    fn from(pos: Position3D) -> Self {
        pos.position_2d()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Unit vector (easting, northing) pointing along the given heading.
pub fn heading_vector(heading: f64) -> Vector2<f64> {
    Vector2::new(heading.sin(), heading.cos())
}

/// Bearing of a displacement vector, in [0, 2pi).
pub fn bearing(delta_en: &Vector2<f64>) -> f64 {
    wrap_2pi(delta_en[0].atan2(delta_en[1]))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_bearing() {
        assert_eq!(bearing(&Vector2::new(0.0, 1.0)), 0.0);
        assert!((bearing(&Vector2::new(1.0, 0.0)) - FRAC_PI_2).abs() < 1e-12);
        assert!((bearing(&Vector2::new(0.0, -1.0)) - PI).abs() < 1e-12);
        assert!((bearing(&Vector2::new(-1.0, 0.0)) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_position_3d_heading_wrapped() {
        let p = Position3D::new(1.0, 2.0, -FRAC_PI_2);
        assert!((p.heading - 3.0 * FRAC_PI_2).abs() < 1e-12);

        let p = Position3D::new(1.0, 2.0, 2.0 * PI);
        assert_eq!(p.heading, 0.0);
        assert_eq!(Position2D::from(p), Position2D::new(1.0, 2.0));
    }

    #[test]
    fn test_distance() {
        let a = GeoCoord::new(0.0, 0.0, 10.0);
        let b = GeoCoord::new(3.0, 4.0, -5.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(a.distance_sq_to(&b), 25.0);
        assert!(!GeoCoord::new(std::f64::NAN, 0.0, 0.0).is_finite());
    }
}
