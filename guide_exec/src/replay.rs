//! # Sample log replay
//!
//! Loads a CSV log of timestamped GPS samples (with optional IMU columns)
//! and hands them out as the replay clock passes their timestamps.
//!
//! Expected columns, in any order:
//!
//! `time_s, easting, northing, altitude, fix_quality, satellite_count, hdop,
//! age_s, imu_roll, imu_pitch, imu_heading, imu_yaw_rate, imu_calibrated`
//!
//! The `imu_*` columns may be missing or left empty. A row carries an IMU
//! sample only if its `imu_heading` is set.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

// Internal
use crate::pos_est::{GpsData, ImuData};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One recorded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Time since the start of the log.
    ///
    /// Units: seconds
    pub time_s: f64,

    pub gps: GpsData,
    pub imu: Option<ImuData>,
}

/// A replay of a sample log.
///
/// After loading use `.get_pending` to acquire the samples due at the
/// current replay time.
pub struct Replay {
    samples: VecDeque<Sample>,
}

/// A row of the log as written in the CSV file.
#[derive(Deserialize)]
struct SampleRecord {
    time_s: f64,
    easting: f64,
    northing: f64,
    #[serde(default)]
    altitude: f64,
    #[serde(default)]
    fix_quality: u8,
    #[serde(default)]
    satellite_count: u8,
    #[serde(default)]
    hdop: f64,
    #[serde(default)]
    age_s: f64,
    #[serde(default)]
    imu_roll: Option<f64>,
    #[serde(default)]
    imu_pitch: Option<f64>,
    #[serde(default)]
    imu_heading: Option<f64>,
    #[serde(default)]
    imu_yaw_rate: Option<f64>,
    #[serde(default)]
    imu_calibrated: Option<bool>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Could not load the sample log: {0}")]
    LoadError(csv::Error),

    #[error("Invalid sample on line {0}: {1}")]
    InvalidSample(usize, csv::Error),

    #[error("The sample log is empty")]
    Empty,

    #[error("Sample on line {0} has a negative or non-finite time")]
    InvalidTime(usize),

    #[error("Sample on line {0} is earlier than the one before it")]
    TimeNotMonotonic(usize),
}

pub enum PendingSamples {
    None,
    Some(Vec<Sample>),
    EndOfReplay
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Replay {
    /// Load a replay from the given CSV file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(ReplayError::LoadError)?;

        Self::from_csv(reader)
    }

    /// Load a replay from any CSV source.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, ReplayError> {
        Self::from_csv(
            csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(rdr)
        )
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ReplayError> {
        let mut samples: VecDeque<Sample> = VecDeque::new();

        for (i, result) in reader.deserialize().enumerate() {
            // Header is line 1
            let line = i + 2;

            let record: SampleRecord = result
                .map_err(|e| ReplayError::InvalidSample(line, e))?;

            if !(record.time_s.is_finite() && record.time_s >= 0.0) {
                return Err(ReplayError::InvalidTime(line));
            }

            if let Some(prev) = samples.back() {
                if record.time_s < prev.time_s {
                    return Err(ReplayError::TimeNotMonotonic(line));
                }
            }

            samples.push_back(record.into());
        }

        if samples.is_empty() {
            return Err(ReplayError::Empty);
        }

        Ok(Self { samples })
    }

    /// Return the samples due at `current_time_s`, oldest first.
    pub fn get_pending(&mut self, current_time_s: f64) -> PendingSamples {
        if self.samples.is_empty() {
            return PendingSamples::EndOfReplay;
        }

        let mut pending = vec![];

        while let Some(s) = self.samples.front() {
            if s.time_s > current_time_s {
                break;
            }

            if let Some(s) = self.samples.pop_front() {
                pending.push(s);
            }
        }

        if pending.is_empty() {
            PendingSamples::None
        }
        else {
            PendingSamples::Some(pending)
        }
    }

    /// Number of samples left to replay.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Timestamp of the last sample.
    pub fn duration_s(&self) -> f64 {
        match self.samples.back() {
            Some(s) => s.time_s,
            None => 0.0
        }
    }
}

impl From<SampleRecord> for Sample {
    fn from(r: SampleRecord) -> Self {
        let imu = r.imu_heading.map(|heading| ImuData {
            roll: r.imu_roll.unwrap_or(0.0),
            pitch: r.imu_pitch.unwrap_or(0.0),
            heading,
            yaw_rate: r.imu_yaw_rate.unwrap_or(0.0),
            is_calibrated: r.imu_calibrated.unwrap_or(false),
        });

        Sample {
            time_s: r.time_s,
            gps: GpsData {
                easting: r.easting,
                northing: r.northing,
                altitude: r.altitude,
                fix_quality: r.fix_quality,
                satellite_count: r.satellite_count,
                hdop: r.hdop,
                age_s: r.age_s,
            },
            imu,
        }
    }
}
