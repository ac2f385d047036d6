//! # Heading calculation
//!
//! The estimator delegates the choice of heading algorithm to an
//! implementation of `HeadingCalculator`. `FixToFixHeading` derives the
//! heading from the bearing between two fixes and can blend in a calibrated
//! IMU heading.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;

// Internal
use super::ImuData;
use crate::geo::bearing;
use util::maths::{get_ang_dist_2pi, wrap_2pi, clamp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Data packet passed to `HeadingCalculator::calc_fix_to_fix_heading`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixToFixData {
    pub current_easting: f64,
    pub current_northing: f64,
    pub previous_easting: f64,
    pub previous_northing: f64,

    /// Baselines shorter than this produce no heading.
    ///
    /// Units: meters
    pub minimum_distance: f64,
}

/// Fix to fix heading with optional IMU blending.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixToFixHeading {
    /// Fraction of the (shortest) difference between the GPS and IMU
    /// headings applied to the GPS heading, in [0, 1].
    imu_fusion_weight: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Heading source used by the position estimator.
pub trait HeadingCalculator {
    /// Heading of travel from the previous to the current fix, in [0, 2pi),
    /// or `None` if the baseline is too short to give a reliable heading.
    fn calc_fix_to_fix_heading(&self, data: &FixToFixData) -> Option<f64>;

    /// Combine a GPS derived heading with an IMU sample.
    fn fuse_imu(&self, gps_heading: f64, _imu: &ImuData) -> f64 {
        gps_heading
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FixToFixData {
    fn delta_en(&self) -> Vector2<f64> {
        Vector2::new(
            self.current_easting - self.previous_easting,
            self.current_northing - self.previous_northing,
        )
    }
}

impl FixToFixHeading {
    pub fn new(imu_fusion_weight: f64) -> Self {
        Self {
            imu_fusion_weight: clamp(&imu_fusion_weight, &0.0, &1.0),
        }
    }
}

impl HeadingCalculator for FixToFixHeading {
    fn calc_fix_to_fix_heading(&self, data: &FixToFixData) -> Option<f64> {
        let delta = data.delta_en();

        if delta.norm() < data.minimum_distance {
            return None;
        }

        Some(bearing(&delta))
    }

    fn fuse_imu(&self, gps_heading: f64, imu: &ImuData) -> f64 {
        if !imu.is_calibrated || self.imu_fusion_weight <= 0.0 {
            return gps_heading;
        }

        let correction = get_ang_dist_2pi(gps_heading, wrap_2pi(imu.heading));
        let fused = wrap_2pi(gps_heading + self.imu_fusion_weight * correction);

        trace!(
            "IMU fusion: gps {:.4} rad, imu {:.4} rad, fused {:.4} rad",
            gps_heading, imu.heading, fused
        );

        fused
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn packet(de: f64, dn: f64) -> FixToFixData {
        FixToFixData {
            current_easting: 10.0 + de,
            current_northing: 20.0 + dn,
            previous_easting: 10.0,
            previous_northing: 20.0,
            minimum_distance: 1.0,
        }
    }

    #[test]
    fn test_fix_to_fix() {
        let calc = FixToFixHeading::default();

        assert_eq!(calc.calc_fix_to_fix_heading(&packet(0.0, 2.0)), Some(0.0));

        let east = calc.calc_fix_to_fix_heading(&packet(2.0, 0.0)).unwrap();
        assert!((east - FRAC_PI_2).abs() < 1e-12);

        let south_west = calc.calc_fix_to_fix_heading(&packet(-1.0, -1.0)).unwrap();
        assert!((south_west - 1.25 * PI).abs() < 1e-12);

        // Too short a baseline
        assert_eq!(calc.calc_fix_to_fix_heading(&packet(0.5, 0.5)), None);
    }

    #[test]
    fn test_fuse_imu() {
        let imu = ImuData {
            heading: 0.2,
            is_calibrated: true,
            ..Default::default()
        };

        // No fusion with a zero weight or an uncalibrated IMU
        assert_eq!(FixToFixHeading::new(0.0).fuse_imu(0.1, &imu), 0.1);
        let uncal = ImuData { is_calibrated: false, ..imu };
        assert_eq!(FixToFixHeading::new(0.5).fuse_imu(0.1, &uncal), 0.1);

        // Half way between the two
        let fused = FixToFixHeading::new(0.5).fuse_imu(0.1, &imu);
        assert!((fused - 0.15).abs() < 1e-12);

        // Blending goes the short way round north
        let imu = ImuData { heading: TAU - 0.1, ..imu };
        let fused = FixToFixHeading::new(0.5).fuse_imu(0.1, &imu);
        assert!(fused.abs() < 1e-12 || (fused - TAU).abs() < 1e-12);
        assert!(fused < TAU);

        // Weights are clamped into [0, 1]
        let fused = FixToFixHeading::new(3.0).fuse_imu(0.1, &ImuData { heading: 0.3, ..imu });
        assert!((fused - 0.3).abs() < 1e-12);
    }
}
