//! Articulated body calculations (trailing tools and tanks)
//!
//! An articulated body is towed by a reference point: the hitch for a tank
//! or a tool hitched directly to the vehicle, or the tank for a tool behind a
//! tank. Each frame the body turns to face the reference point from where it
//! was on the previous frame, and is then placed its hitch length behind the
//! reference point along that heading.
//!
//! When the articulation angle exceeds the body's jackknife threshold the
//! computed heading is discarded and the body is put straight behind the
//! reference point instead. This is a recovery which keeps the geometry
//! stable, not a simulation of the jackknifed implement.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{
    MIN_ARTICULATION_MOVEMENT_M,
    TANK_JACKKNIFE_THRESHOLD_RAD,
    TOOL_JACKKNIFE_THRESHOLD_RAD
};
use crate::geo::{bearing, heading_vector, Position2D, Position3D};
use util::maths::abs_ang_sep;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of moving an articulated body for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticulatedPose {
    pub pose: Position3D,

    /// True if the body was realigned behind its reference this frame.
    pub jackknifed: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if the angle between the implement and its reference is
/// strictly greater than `threshold_rad`.
pub fn is_jackknifed(implement_heading: f64, reference_heading: f64, threshold_rad: f64) -> bool {
    abs_ang_sep(implement_heading, reference_heading) > threshold_rad
}

/// Move an articulated body towed by `reference` for one frame.
///
/// If the vehicle has not moved more than `MIN_ARTICULATION_MOVEMENT_M` the
/// previous pose is kept as is.
pub fn calc_articulated_pose(
    reference: &Position2D,
    reference_heading: f64,
    prev: &Position3D,
    hitch_length_m: f64,
    distance_moved_m: f64,
    threshold_rad: f64
) -> ArticulatedPose {
    if !(distance_moved_m > MIN_ARTICULATION_MOVEMENT_M) {
        return ArticulatedPose {
            pose: *prev,
            jackknifed: false,
        };
    }

    let mut heading = bearing(&(reference.en() - prev.en()));

    let jackknifed = is_jackknifed(heading, reference_heading, threshold_rad);
    if jackknifed {
        heading = reference_heading;
    }

    ArticulatedPose {
        pose: place_behind(reference, heading, hitch_length_m),
        jackknifed,
    }
}

/// Position of a tool trailing the vehicle's hitch, or the tank if `tank` is
/// given.
pub fn calc_trailing_tool_position(
    hitch: &Position2D,
    prev_tool: &Position3D,
    trailing_hitch_m: f64,
    distance_moved_m: f64,
    vehicle_heading: f64,
    tank: Option<&Position3D>
) -> Position3D {
    let (reference, reference_heading) = match tank {
        Some(t) => (t.position_2d(), t.heading),
        None => (*hitch, vehicle_heading)
    };

    calc_articulated_pose(
        &reference,
        reference_heading,
        prev_tool,
        trailing_hitch_m,
        distance_moved_m,
        TOOL_JACKKNIFE_THRESHOLD_RAD
    ).pose
}

/// Position of a tank trailing the vehicle's hitch.
pub fn calc_tank_position(
    hitch: &Position2D,
    prev_tank: &Position3D,
    tank_hitch_m: f64,
    distance_moved_m: f64,
    vehicle_heading: f64
) -> Position3D {
    calc_articulated_pose(
        hitch,
        vehicle_heading,
        prev_tank,
        tank_hitch_m,
        distance_moved_m,
        TANK_JACKKNIFE_THRESHOLD_RAD
    ).pose
}

/// Pivot and working position of a tool trailing a tank.
///
/// Returns `(tool_pivot, tool_working_position)`.
pub fn calc_tbt_tool_position(
    tank: &Position3D,
    prev_tool: &Position3D,
    trailing_hitch_m: f64,
    tool_to_pivot_m: f64,
    distance_moved_m: f64,
    tank_heading: f64
) -> (Position3D, Position3D) {
    let tool_pivot = calc_articulated_pose(
        &tank.position_2d(),
        tank_heading,
        prev_tool,
        trailing_hitch_m,
        distance_moved_m,
        TOOL_JACKKNIFE_THRESHOLD_RAD
    ).pose;

    (tool_pivot, calc_tool_working_position(&tool_pivot, tool_to_pivot_m))
}

/// Working position of a tool, `tool_to_pivot_m` behind the tool's pivot.
pub fn calc_tool_working_position(tool_pivot: &Position3D, tool_to_pivot_m: f64) -> Position3D {
    place_behind(&tool_pivot.position_2d(), tool_pivot.heading, tool_to_pivot_m)
}

/// Pose `length_m` behind `reference`, facing `heading`.
pub fn place_behind(reference: &Position2D, heading: f64, length_m: f64) -> Position3D {
    Position3D::from_vector(reference.en() - heading_vector(heading) * length_m, heading)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn assert_pose(p: &Position3D, e: f64, n: f64, h: f64) {
        assert!(
            (p.easting - e).abs() < 1e-9
                && (p.northing - n).abs() < 1e-9
                && abs_ang_sep(p.heading, h) < 1e-9,
            "{:?} != ({}, {}, {})", p, e, n, h
        );
    }

    #[test]
    fn test_is_jackknifed() {
        // Tool facing directly opposite the vehicle
        assert!(is_jackknifed(PI, 0.0, TOOL_JACKKNIFE_THRESHOLD_RAD));
        assert!(is_jackknifed(0.0, PI, TANK_JACKKNIFE_THRESHOLD_RAD));

        // Aligned or gently articulated
        assert!(!is_jackknifed(0.0, 0.0, TOOL_JACKKNIFE_THRESHOLD_RAD));
        assert!(!is_jackknifed(1.0, 0.0, TOOL_JACKKNIFE_THRESHOLD_RAD));

        // Either side of the threshold, across the 0/2pi wrap
        let eps = 1e-6;
        assert!(is_jackknifed(1.9 + eps, 0.0, 1.9));
        assert!(!is_jackknifed(1.9 - eps, 0.0, 1.9));
        assert!(is_jackknifed(TAU - 0.5, 1.4 + eps, 1.9));
        assert!(!is_jackknifed(TAU - 0.5, 1.4 - eps, 1.9));

        // The boundary itself is not jackknifed
        assert!(!is_jackknifed(2.0, 0.0, 2.0));

        // Between the tool and tank thresholds
        assert!(is_jackknifed(1.95, 0.0, TOOL_JACKKNIFE_THRESHOLD_RAD));
        assert!(!is_jackknifed(1.95, 0.0, TANK_JACKKNIFE_THRESHOLD_RAD));
    }

    #[test]
    fn test_trailing_straight() {
        // Vehicle heading north, hitch at origin, tool previously 2.5 m
        // behind and a little to the east.
        let hitch = Position2D::new(0.0, 0.0);
        let prev = Position3D::new(0.5, -2.5, 0.0);

        let tool = calc_trailing_tool_position(&hitch, &prev, 2.5, 0.2, 0.0, None);

        let heading = bearing(&(hitch.en() - prev.en()));
        assert!(heading > 1.5 * PI);
        assert_pose(
            &tool,
            -2.5 * heading.sin(),
            -2.5 * heading.cos(),
            heading
        );

        // Exactly 2.5 m from the hitch
        assert!(((tool.en() - hitch.en()).norm() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_converges_behind() {
        let mut hitch = Position2D::new(0.0, 0.0);
        let mut tool = Position3D::new(1.0, -2.0, 0.0);

        // Drive north for 100 m in 0.5 m steps
        for _ in 0..200 {
            hitch.northing += 0.5;
            tool = calc_trailing_tool_position(&hitch, &tool, 2.5, 0.5, 0.0, None);
        }

        assert_pose(&tool, 0.0, hitch.northing - 2.5, 0.0);
    }

    #[test]
    fn test_trailing_standstill() {
        let hitch = Position2D::new(3.0, 3.0);
        let prev = Position3D::new(0.0, 0.0, 1.0);

        let tool = calc_trailing_tool_position(&hitch, &prev, 2.5, 0.0001, 0.0, None);
        assert_eq!(tool, prev);

        let tank = calc_tank_position(&hitch, &prev, 2.5, 0.0, 0.0);
        assert_eq!(tank, prev);
    }

    #[test]
    fn test_trailing_jackknife() {
        // Vehicle heading north, tool ahead of the hitch so it would face
        // south, i.e. opposite the vehicle.
        let hitch = Position2D::new(0.0, 0.0);
        let prev = Position3D::new(0.0, 2.5, PI);

        let result = calc_articulated_pose(
            &hitch, 0.0, &prev, 2.5, 0.1, TOOL_JACKKNIFE_THRESHOLD_RAD
        );
        assert!(result.jackknifed);
        assert_pose(&result.pose, 0.0, -2.5, 0.0);

        let tool = calc_trailing_tool_position(&hitch, &prev, 2.5, 0.1, 0.0, None);
        assert_eq!(tool, result.pose);
    }

    #[test]
    fn test_tool_and_tank_thresholds_differ() {
        // Previous body position such that the bearing to the hitch is 1.95
        // rad off the vehicle heading of north.
        let hitch = Position2D::new(0.0, 0.0);
        let angle: f64 = 1.95;
        let prev = Position3D::new(-3.0 * angle.sin(), -3.0 * angle.cos(), 0.0);

        // Tool threshold (1.9) exceeded, realigned behind the hitch
        let tool = calc_trailing_tool_position(&hitch, &prev, 3.0, 0.1, 0.0, None);
        assert_pose(&tool, 0.0, -3.0, 0.0);

        // Tank threshold (2.0) not exceeded, follows the bearing
        let tank = calc_tank_position(&hitch, &prev, 3.0, 0.1, 0.0);
        assert_pose(&tank, prev.easting, prev.northing, angle);
    }

    #[test]
    fn test_trailing_behind_tank() {
        let hitch = Position2D::new(0.0, 0.0);
        let tank = Position3D::new(10.0, 0.0, FRAC_PI_2);
        let prev = Position3D::new(6.0, 0.0, FRAC_PI_2);

        // The tank is the reference, not the hitch
        let tool = calc_trailing_tool_position(&hitch, &prev, 3.0, 0.5, 0.0, Some(&tank));
        assert_pose(&tool, 7.0, 0.0, FRAC_PI_2);

        // Tool facing against the tank jackknifes to the tank heading
        let prev = Position3D::new(14.0, 0.0, 3.0 * FRAC_PI_2);
        let tool = calc_trailing_tool_position(&hitch, &prev, 3.0, 0.5, 0.0, Some(&tank));
        assert_pose(&tool, 7.0, 0.0, FRAC_PI_2);
    }

    #[test]
    fn test_tbt_tool() {
        let tank = Position3D::new(0.0, -4.0, 0.0);
        let prev = Position3D::new(0.0, -7.0, 0.0);

        let (pivot, working) = calc_tbt_tool_position(&tank, &prev, 2.0, 1.5, 0.2, 0.0);
        assert_pose(&pivot, 0.0, -6.0, 0.0);
        assert_pose(&working, 0.0, -7.5, 0.0);

        // Standing still keeps the tool pivot where it was
        let (pivot, working) = calc_tbt_tool_position(&tank, &prev, 2.0, 1.5, 0.0, 0.0);
        assert_eq!(pivot, prev);
        assert_pose(&working, 0.0, -8.5, 0.0);
    }
}
