//! # Position estimator module
//!
//! Turns the stream of GPS samples into a pose estimate (position, heading,
//! speed and direction of travel) while rejecting standstill jitter.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod heading;
mod history;
mod params;
mod state;
mod types;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use heading::*;
pub use history::PositionHistory;
pub use params::Params;
pub use state::*;
pub use types::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of accepted fixes kept in the position history.
pub const HISTORY_CAPACITY: usize = 10;

/// Samples closer than this to the last accepted fix only update the
/// displayed position.
///
/// Units: meters
pub const NOISE_FLOOR_M: f64 = 0.05;

/// Minimum baseline between two fixes for a fix to fix heading.
///
/// Units: meters
pub const MIN_HEADING_BASELINE_M: f64 = 1.0;

/// Angle between the new travel heading and the current heading above which
/// the vehicle is considered to be reversing.
///
/// Units: radians
pub const REVERSE_THRESHOLD_RAD: f64 = 1.57;

/// Weight of the previous frequency estimate in the complementary filter.
pub const FREQ_FILTER_PREV_WEIGHT: f64 = 0.98;

/// Weight of the instantaneous frequency in the complementary filter.
pub const FREQ_FILTER_NEW_WEIGHT: f64 = 0.02;

/// Units: Hertz
pub const MIN_FREQUENCY_HZ: f64 = 3.0;

/// Units: Hertz
pub const MAX_FREQUENCY_HZ: f64 = 70.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during position estimation.
#[derive(Debug, thiserror::Error)]
pub enum PosEstError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("The estimator state was poisoned by a thread panicking while holding it")]
    LockPoisoned,
}
