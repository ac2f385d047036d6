//! # Data Store

use log::warn;
use serde::Serialize;

use crate::{
    kinematics,
    pos_est::PositionUpdate,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive kinematics errors after which the executable gives
/// up.
pub const MAX_CONSEC_KIN_ERRORS: u64 = 10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of accepted position updates processed so far
    pub num_updates: u64,

    /// Replay time of the current cycle
    pub replay_time_s: f64,

    // Position estimation
    pub pos_update: Option<PositionUpdate>,
    arch_pos_update: Archiver,

    // Kinematics
    pub kinematics: kinematics::Kinematics,
    pub kin_output: Option<kinematics::VehicleGeometry>,
    pub kin_status_rpt: kinematics::StatusReport,

    // Monitoring Counters
    /// Number of consecutive kinematics processing errors
    pub num_consec_kin_errors: u64,

    /// Number of samples rejected by the estimator
    pub num_rejected_samples: u64,
}

/// Flat archive record of a position update.
#[derive(Serialize)]
struct PosUpdateRecord {
    time_s: f64,
    easting_m: f64,
    northing_m: f64,
    altitude_m: f64,
    heading_rad: f64,
    speed_ms: f64,
    distance_travelled_m: f64,
    is_reversing: bool,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Start archiving position updates into the session.
    pub fn init_archives(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_pos_update = Archiver::from_path(session, "pos_est/pos_update.csv")?;
        Ok(())
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that are only valid for a single update.
    pub fn cycle_start(&mut self, replay_time_s: f64) {
        self.pos_update = None;
        self.kin_output = None;
        self.kin_status_rpt = kinematics::StatusReport::default();

        self.replay_time_s = replay_time_s;
    }

    /// Record the outcome of kinematics processing.
    ///
    /// Returns true if the number of consecutive errors has reached
    /// `MAX_CONSEC_KIN_ERRORS`.
    pub fn kin_result(
        &mut self,
        result: Result<
            (kinematics::VehicleGeometry, kinematics::StatusReport),
            kinematics::KinematicsError
        >
    ) -> bool {
        match result {
            Ok((o, r)) => {
                self.kin_output = Some(o);
                self.kin_status_rpt = r;
                self.num_consec_kin_errors = 0;
            },
            Err(e) => {
                warn!("Kinematics processing error: {}", e);
                self.num_consec_kin_errors += 1;
            }
        }

        self.num_consec_kin_errors >= MAX_CONSEC_KIN_ERRORS
    }
}

impl Archived for DataStore {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if let Some(u) = self.pos_update {
            if self.arch_pos_update.is_initialised() {
                self.arch_pos_update.serialise(PosUpdateRecord {
                    time_s: self.replay_time_s,
                    easting_m: u.position.easting,
                    northing_m: u.position.northing,
                    altitude_m: u.position.altitude,
                    heading_rad: u.heading,
                    speed_ms: u.speed,
                    distance_travelled_m: u.distance_travelled,
                    is_reversing: u.is_reversing,
                })?;
            }
        }

        self.kinematics.write()
    }
}
