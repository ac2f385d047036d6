//! Parameters structure for the position estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the position estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Frequency estimate used before any sample interval has been measured,
    /// and after a reset.
    ///
    /// Units: Hertz
    pub nominal_frequency_hz: f64,

    /// Weight given to a calibrated IMU heading when fusing it with the fix
    /// to fix heading, in [0, 1]. Zero disables fusion.
    pub imu_fusion_weight: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            nominal_frequency_hz: 10.0,
            imu_fusion_weight: 0.0,
        }
    }
}
