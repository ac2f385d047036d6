//! Parameters structure for Kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle and implement geometry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleParams {

    // ---- VEHICLE ----

    /// Distance from the antenna back to the pivot axle.
    ///
    /// Units: meters
    pub antenna_pivot_m: f64,

    /// Distance from the pivot axle forward to the steer axle.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// Distance from the pivot axle to the hitch along the heading. Negative
    /// for a rear hitch.
    ///
    /// Units: meters
    pub hitch_length_m: f64,

    // ---- IMPLEMENT ----

    /// How the tool is attached to the vehicle.
    pub tool_hitch: ToolHitch,

    /// Distance from the tool's reference point (hitch, or tank) back to the
    /// tool pivot.
    ///
    /// Units: meters
    pub trailing_hitch_m: f64,

    /// Distance from the hitch back to the tank axle.
    ///
    /// Units: meters
    pub tank_hitch_m: f64,

    /// Distance from the tool pivot back to the tool's working position.
    ///
    /// Units: meters
    pub tool_to_pivot_m: f64,

    /// Units: meters
    pub tool_width_m: f64,

    // ---- GUIDANCE ----

    /// Time ahead of the pivot used for the look-ahead point.
    ///
    /// Units: seconds
    pub look_ahead_time_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The way the tool is attached to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ToolHitch {
    /// Tool fixed to the hitch, always at the vehicle heading.
    Rigid,

    /// Tool towed directly from the hitch.
    Trailing,

    /// Tank towed from the hitch, tool towed from the tank.
    TankBetweenTractor,
}

impl Default for ToolHitch {
    fn default() -> Self {
        ToolHitch::Rigid
    }
}
