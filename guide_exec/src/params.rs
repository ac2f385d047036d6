//! # Guidance Executable Parameters
//!
//! This module provide parameters for the guidance executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;
use util::logger::LoggerParams;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest accepted replay loop period.
///
/// Units: seconds
pub const MAX_CYCLE_PERIOD_S: f64 = 60.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GuideExecParams {

    /// Logging setup
    #[serde(default)]
    pub logger: LoggerParams,

    /// If true samples are fed to the estimator at the rate they were
    /// recorded, otherwise as fast as possible.
    #[serde(default)]
    pub realtime: bool,

    /// Period of the replay loop when running in real time.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("cycle_period_s must be in (0, {}] s, found {0}", MAX_CYCLE_PERIOD_S)]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GuideExecParams {
    /// Check the values that cannot be expressed by the types alone.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.cycle_period_s > 0.0 && self.cycle_period_s <= MAX_CYCLE_PERIOD_S) {
            return Err(ParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::logger::LevelFilter;

    #[test]
    fn test_load_exec_params() {
        let params: GuideExecParams = util::params::from_str(r#"
            cycle_period_s = 0.01

            [logger]
            min_level = "Debug"
        "#).unwrap();

        assert_eq!(params.cycle_period_s, 0.01);
        assert!(!params.realtime);
        assert_eq!(params.logger.min_level, LevelFilter::Debug);
        params.validate().unwrap();
    }

    #[test]
    fn test_invalid_cycle_period() {
        for bad in ["0.0", "-0.01", "inf", "nan", "1e30"].iter() {
            let params: GuideExecParams = util::params::from_str(
                &format!("cycle_period_s = {}", bad)
            ).unwrap();

            assert!(matches!(
                params.validate(),
                Err(ParamsError::InvalidCyclePeriod(_))
            ), "{} accepted", bad);
        }
    }

    #[test]
    fn test_shipped_params() {
        let mut dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.push("params");

        let exec: GuideExecParams = util::params::load_from_path(dir.join("guide_exec.toml"))
            .unwrap();
        exec.validate().unwrap();

        let pos_est: crate::pos_est::Params = util::params::load_from_path(
            dir.join("pos_est.toml")
        ).unwrap();
        assert_eq!(pos_est.nominal_frequency_hz, 10.0);

        let vehicle: crate::kinematics::VehicleParams = util::params::load_from_path(
            dir.join("vehicle.toml")
        ).unwrap();
        assert_eq!(vehicle.tool_hitch, crate::kinematics::ToolHitch::Trailing);
    }
}
