//! # Guidance library.
//!
//! Position and kinematics estimation for precision agriculture guidance.
//! This library allows the executable and benches to access items defined
//! inside the guidance crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - per cycle data shared between the executable's modules
pub mod data_store;

/// Planar geometry types shared by the estimator and kinematics
pub mod geo;

/// Kinematics - maps the antenna pose onto the vehicle and its implements
pub mod kinematics;

/// Guidance executable parameters
pub mod params;

/// Position estimator - turns GPS samples into a pose estimate
pub mod pos_est;

/// Replay - feeds recorded GPS/IMU sample logs to the estimator
pub mod replay;
