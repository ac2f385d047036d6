//! # Kinematics module
//!
//! Maps the antenna pose produced by the position estimator onto every
//! other reference point of the vehicle and its implements: pivot axle,
//! steer axle, hitch, tank (tank between tractor) and tool.
//!
//! The `calc_*` functions are pure. Articulated bodies (trailing tool, tank)
//! depend on their pose from the previous frame, which the caller threads
//! through explicitly, see `ArticulationState`. The `Kinematics` module does
//! this threading for a configured vehicle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_trailing;
mod calc_vehicle;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use calc_trailing::*;
pub use calc_vehicle::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Articulation angle above which a trailing tool is jackknifed.
///
/// Units: radians
pub const TOOL_JACKKNIFE_THRESHOLD_RAD: f64 = 1.9;

/// Articulation angle above which a tank is jackknifed.
///
/// Units: radians
pub const TANK_JACKKNIFE_THRESHOLD_RAD: f64 = 2.0;

/// Articulated bodies are only moved once the vehicle has moved more than
/// this since the last frame.
///
/// Units: meters
pub const MIN_ARTICULATION_MOVEMENT_M: f64 = 0.0001;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in the Kinematics module.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    #[error("Could not load the vehicle parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not initialise the kinematics archive: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("The antenna pose contains a non-finite value")]
    NonFiniteInput,
}
