//! Rigid body transforms of the vehicle

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geo::{heading_vector, Position2D, Position3D};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Position of the pivot axle, `antenna_pivot_m` behind the antenna.
pub fn calc_pivot_position(antenna: &Position2D, heading: f64, antenna_pivot_m: f64) -> Position3D {
    Position3D::from_vector(antenna.en() - heading_vector(heading) * antenna_pivot_m, heading)
}

/// Position of the steer axle, one wheelbase ahead of the pivot.
pub fn calc_steer_axle_position(pivot: &Position3D, heading: f64, wheelbase_m: f64) -> Position3D {
    Position3D::from_vector(pivot.en() + heading_vector(heading) * wheelbase_m, heading)
}

/// Position of the hitch.
///
/// `hitch_length_m` is measured from the pivot along the heading, so a rear
/// hitch has a negative length.
pub fn calc_hitch_position(
    antenna: &Position2D,
    heading: f64,
    hitch_length_m: f64,
    antenna_pivot_m: f64
) -> Position2D {
    Position2D::from_vector(
        antenna.en() + heading_vector(heading) * (hitch_length_m - antenna_pivot_m)
    )
}

/// A tool fixed to the vehicle sits on the hitch and shares the vehicle's
/// heading.
pub fn calc_rigid_tool_position(hitch: &Position2D, heading: f64) -> Position3D {
    Position3D::new(hitch.easting, hitch.northing, heading)
}

/// Point ahead of the pivot used by guidance.
///
/// The distance ahead is the distance covered in `look_ahead_time_s` at
/// `speed_ms`, but never less than half the tool width.
pub fn calc_look_ahead_position(
    pivot: &Position3D,
    heading: f64,
    tool_width_m: f64,
    speed_ms: f64,
    look_ahead_time_s: f64
) -> Position2D {
    let dist_m = (tool_width_m * 0.5).max(speed_ms * look_ahead_time_s);

    Position2D::from_vector(pivot.en() + heading_vector(heading) * dist_m)
}
