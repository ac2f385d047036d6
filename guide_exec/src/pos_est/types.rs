//! Input and output data of the position estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Internal
use crate::geo::GeoCoord;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single GPS sample, already projected into the planar frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsData {
    /// Units: meters
    pub easting: f64,

    /// Units: meters
    pub northing: f64,

    /// Units: meters
    pub altitude: f64,

    /// Fix quality as reported by the receiver (0 = invalid, 1 = GPS,
    /// 2 = DGPS, 4 = RTK fixed, 5 = RTK float).
    pub fix_quality: u8,

    /// Number of satellites used in the solution
    pub satellite_count: u8,

    /// Horizontal dilution of precision
    pub hdop: f64,

    /// Age of the differential corrections.
    ///
    /// Units: seconds
    pub age_s: f64,
}

/// An optional IMU sample accompanying a GPS sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    /// Units: radians
    pub roll: f64,

    /// Units: radians
    pub pitch: f64,

    /// Units: radians, same convention as the GPS heading
    pub heading: f64,

    /// Units: radians/second
    pub yaw_rate: f64,

    /// Only calibrated IMU headings are fused into the GPS heading.
    pub is_calibrated: bool,
}

/// Notification published once for every GPS sample accepted by the
/// estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionUpdate {
    /// Antenna position
    pub position: GeoCoord,

    /// Direction the vehicle is facing.
    ///
    /// Units: radians, [0, 2pi)
    pub heading: f64,

    /// Units: meters/second
    pub speed: f64,

    /// Distance between this sample and the previous accepted one.
    ///
    /// Units: meters
    pub distance_travelled: f64,

    pub is_reversing: bool,

    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GpsData {
    /// Sample at the given planar position with a nominal RTK fix.
    pub fn at(easting: f64, northing: f64) -> Self {
        Self {
            easting,
            northing,
            altitude: 0.0,
            fix_quality: 4,
            satellite_count: 12,
            hdop: 0.8,
            age_s: 0.0,
        }
    }

    pub fn coord(&self) -> GeoCoord {
        GeoCoord::new(self.easting, self.northing, self.altitude)
    }
}
