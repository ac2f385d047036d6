//! Implementation of the position estimator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::PI;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;
use chrono::Utc;
use log::{debug, trace, warn};

// Internal
use super::*;
use crate::geo::GeoCoord;
use util::maths::{abs_ang_sep, clamp, wrap_2pi};
use util::time::std_duration_to_seconds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Identifies a subscription to position updates.
pub type SubscriptionId = u64;

/// Position estimator.
///
/// All state is kept behind a single lock, so the estimator can be shared
/// between threads (for example in an `Arc`) and fed from several producers.
/// Each call to `process_gps_position` is applied atomically, and updates are
/// delivered to subscribers in the order they were applied.
///
/// Subscribers are called without any estimator lock held, so they may read
/// the estimator and subscribe or unsubscribe. They must not feed samples to
/// the estimator that is calling them.
pub struct PosEst {
    state: Mutex<EstState>,

    /// Ticket of the next accepted update, taken under the state lock.
    next_ticket: AtomicU64,

    /// Ticket whose notifications are due next.
    turn: Mutex<u64>,
    turn_changed: Condvar,

    subscribers: Mutex<Subscribers>,

    heading_calc: Box<dyn HeadingCalculator + Send + Sync>,
}

/// Mutable estimator state.
#[derive(Debug, Clone)]
struct EstState {
    nominal_frequency_hz: f64,

    /// Last received position, including noise gated samples.
    current_position: GeoCoord,

    /// Units: radians, [0, 2pi)
    heading_rad: f64,

    /// Units: meters/second
    speed_ms: f64,

    is_reversing: bool,

    /// Complementary filtered sample frequency.
    ///
    /// Units: Hertz
    frequency_hz: f64,

    /// Time of the previous sample, `None` until the first sample after
    /// construction or reset.
    last_sample: Option<Instant>,

    history: PositionHistory,

    /// Heading pushed by an external source, applied on the next accepted
    /// sample.
    external_heading_rad: Option<f64>,
}

#[derive(Default)]
struct Subscribers {
    next_id: SubscriptionId,
    list: Vec<(SubscriptionId, Subscriber)>,

    /// Subscribers moved out of `list` for the delivery in progress.
    delivering: Vec<SubscriptionId>,

    /// Subscribers from `delivering` that unsubscribed during the delivery.
    removed: Vec<SubscriptionId>,
}

enum Subscriber {
    Callback(Box<dyn FnMut(&PositionUpdate) + Send>),
    Channel(Sender<PositionUpdate>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PosEst {
    /// Create a new estimator using the fix to fix heading calculator.
    pub fn new(params: &Params) -> Self {
        Self::with_heading_calculator(
            params,
            Box::new(FixToFixHeading::new(params.imu_fusion_weight))
        )
    }

    /// Create a new estimator with a custom heading calculator.
    pub fn with_heading_calculator(
        params: &Params,
        heading_calc: Box<dyn HeadingCalculator + Send + Sync>
    ) -> Self {
        let nominal_frequency_hz = if params.nominal_frequency_hz.is_finite() {
            clamp(&params.nominal_frequency_hz, &MIN_FREQUENCY_HZ, &MAX_FREQUENCY_HZ)
        }
        else {
            Params::default().nominal_frequency_hz
        };

        if nominal_frequency_hz != params.nominal_frequency_hz {
            warn!(
                "Nominal frequency {} Hz out of range, using {} Hz",
                params.nominal_frequency_hz, nominal_frequency_hz
            );
        }

        Self {
            state: Mutex::new(EstState::new(nominal_frequency_hz)),
            next_ticket: AtomicU64::new(0),
            turn: Mutex::new(0),
            turn_changed: Condvar::new(),
            subscribers: Mutex::new(Subscribers::default()),
            heading_calc,
        }
    }

    /// Process a new GPS sample received now.
    ///
    /// Returns the published update, or `None` if the sample was within the
    /// noise floor of the last accepted fix.
    pub fn process_gps_position(
        &self,
        gps: &GpsData,
        imu: Option<&ImuData>
    ) -> Result<Option<PositionUpdate>, PosEstError> {
        self.process_gps_position_at(gps, imu, Instant::now())
    }

    /// Process a new GPS sample received at the given instant.
    pub fn process_gps_position_at(
        &self,
        gps: &GpsData,
        imu: Option<&ImuData>,
        received: Instant
    ) -> Result<Option<PositionUpdate>, PosEstError> {
        let coord = gps.coord();
        if !coord.is_finite() {
            return Err(PosEstError::InvalidArgument(format!(
                "GPS sample position must be finite, got {:?}", coord
            )));
        }

        let accepted = {
            let mut state = self.lock_state()?;
            state.update(coord, imu, received, &*self.heading_calc)
                .map(|u| (u, self.next_ticket.fetch_add(1, Ordering::SeqCst)))
        };

        // The update is committed, delivery cannot fail.
        match accepted {
            Some((update, ticket)) => {
                self.notify(&update, ticket);
                Ok(Some(update))
            },
            None => Ok(None)
        }
    }

    /// Get up to `count` of the most recent accepted positions, newest
    /// first.
    pub fn get_position_history(&self, count: usize) -> Result<Vec<GeoCoord>, PosEstError> {
        if count == 0 {
            return Err(PosEstError::InvalidArgument(
                String::from("History count must be greater than zero")
            ));
        }

        Ok(self.lock_state()?.history.recent(count))
    }

    /// Clear the heading, speed, direction and history, and restart the
    /// frequency estimate.
    pub fn reset(&self) -> Result<(), PosEstError> {
        let mut state = self.lock_state()?;
        let current_position = state.current_position;
        let nominal_frequency_hz = state.nominal_frequency_hz;

        *state = EstState::new(nominal_frequency_hz);
        state.current_position = current_position;

        debug!("Position estimator reset");

        Ok(())
    }

    /// Supply a heading computed by an external source (VTG, dual antenna,
    /// IMU fusion). It replaces the fix to fix heading on the next accepted
    /// sample.
    pub fn on_heading_changed(&self, heading_rad: f64) -> Result<(), PosEstError> {
        if !heading_rad.is_finite() {
            return Err(PosEstError::InvalidArgument(format!(
                "External heading must be finite, got {}", heading_rad
            )));
        }

        self.lock_state()?.external_heading_rad = Some(wrap_2pi(heading_rad));

        Ok(())
    }

    /// Most recently received position, including samples rejected by the
    /// noise gate.
    pub fn get_current_position(&self) -> Result<GeoCoord, PosEstError> {
        Ok(self.lock_state()?.current_position)
    }

    /// Units: radians, [0, 2pi)
    pub fn get_current_heading(&self) -> Result<f64, PosEstError> {
        Ok(self.lock_state()?.heading_rad)
    }

    /// Units: meters/second
    pub fn get_current_speed(&self) -> Result<f64, PosEstError> {
        Ok(self.lock_state()?.speed_ms)
    }

    pub fn is_reversing(&self) -> Result<bool, PosEstError> {
        Ok(self.lock_state()?.is_reversing)
    }

    /// Units: Hertz
    pub fn get_frequency_hz(&self) -> Result<f64, PosEstError> {
        Ok(self.lock_state()?.frequency_hz)
    }

    /// Call `callback` with every accepted update, on the thread that
    /// processed the sample.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId, PosEstError>
    where
        F: FnMut(&PositionUpdate) + Send + 'static
    {
        self.add_subscriber(Subscriber::Callback(Box::new(callback)))
    }

    /// Receive every accepted update on a channel. The subscription is
    /// dropped once the receiver is.
    pub fn subscribe_channel(&self) -> Result<Receiver<PositionUpdate>, PosEstError> {
        let (tx, rx) = channel();
        self.add_subscriber(Subscriber::Channel(tx))?;
        Ok(rx)
    }

    /// Remove a subscription, returns false if it did not exist.
    ///
    /// May be called from inside a subscriber, including for itself.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, PosEstError> {
        let mut subs = self.lock_subscribers();

        let len_before = subs.list.len();
        subs.list.retain(|(i, _)| *i != id);
        if subs.list.len() != len_before {
            return Ok(true);
        }

        match subs.delivering.iter().position(|i| *i == id) {
            Some(pos) => {
                subs.delivering.swap_remove(pos);
                subs.removed.push(id);
                Ok(true)
            },
            None => Ok(false)
        }
    }

    fn add_subscriber(&self, sub: Subscriber) -> Result<SubscriptionId, PosEstError> {
        let mut subs = self.lock_subscribers();

        let id = subs.next_id;
        subs.next_id += 1;
        subs.list.push((id, sub));

        Ok(id)
    }

    /// Deliver the update with the given ticket once all earlier tickets
    /// have been delivered.
    fn notify(&self, update: &PositionUpdate, ticket: u64) {
        {
            let mut turn = self.turn.lock().unwrap_or_else(PoisonError::into_inner);
            while *turn != ticket {
                turn = self.turn_changed.wait(turn).unwrap_or_else(PoisonError::into_inner);
            }
        }

        self.deliver(update);

        let mut turn = self.turn.lock().unwrap_or_else(PoisonError::into_inner);
        *turn += 1;
        self.turn_changed.notify_all();
    }

    /// Call every subscriber with no lock held. Only one delivery runs at a
    /// time.
    fn deliver(&self, update: &PositionUpdate) {
        let mut taken = {
            let mut subs = self.lock_subscribers();
            let taken = std::mem::take(&mut subs.list);
            subs.delivering = taken.iter().map(|(id, _)| *id).collect();
            taken
        };

        taken.retain_mut(|(id, sub)| match sub {
            Subscriber::Callback(cb) => {
                match panic::catch_unwind(AssertUnwindSafe(|| cb(update))) {
                    Ok(()) => true,
                    Err(_) => {
                        warn!("Position subscriber {} panicked and was removed", id);
                        false
                    }
                }
            },
            Subscriber::Channel(tx) => tx.send(*update).is_ok()
        });

        let mut subs = self.lock_subscribers();
        let removed = std::mem::take(&mut subs.removed);
        subs.delivering.clear();
        taken.retain(|(id, _)| !removed.contains(id));

        // Subscriptions made during the delivery go after the existing ones
        let added = std::mem::replace(&mut subs.list, taken);
        subs.list.extend(added);
    }

    /// The subscriber list holds no estimator state, so a poisoned lock is
    /// recovered rather than reported.
    fn lock_subscribers(&self) -> MutexGuard<Subscribers> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> Result<MutexGuard<EstState>, PosEstError> {
        self.state.lock().map_err(|_| PosEstError::LockPoisoned)
    }
}

impl EstState {
    fn new(nominal_frequency_hz: f64) -> Self {
        Self {
            nominal_frequency_hz,
            current_position: GeoCoord::default(),
            heading_rad: 0.0,
            speed_ms: 0.0,
            is_reversing: false,
            frequency_hz: nominal_frequency_hz,
            last_sample: None,
            history: PositionHistory::default(),
            external_heading_rad: None,
        }
    }

    /// Apply one sample to the state.
    fn update(
        &mut self,
        coord: GeoCoord,
        imu: Option<&ImuData>,
        received: Instant,
        heading_calc: &dyn HeadingCalculator
    ) -> Option<PositionUpdate> {

        self.update_frequency(received);

        // With no history there is nothing to measure against, accept the
        // sample as the starting point.
        let last_fix = match self.history.latest() {
            Some(l) => *l,
            None => {
                self.current_position = coord;
                self.speed_ms = 0.0;
                self.history.push(coord);

                debug!("First fix accepted at {:?}", coord);

                return Some(self.make_update(0.0));
            }
        };

        let distance_m = coord.distance_to(&last_fix);

        // ---- NOISE GATE ----

        if distance_m < NOISE_FLOOR_M {
            trace!("Sample within noise floor ({:.4} m), pose not updated", distance_m);
            self.current_position = coord;
            return None;
        }

        // ---- HEADING ----

        let travel_heading = self.history
            .find_oldest_beyond(&coord, MIN_HEADING_BASELINE_M.powi(2))
            .and_then(|reference| heading_calc.calc_fix_to_fix_heading(&FixToFixData {
                current_easting: coord.easting,
                current_northing: coord.northing,
                previous_easting: reference.easting,
                previous_northing: reference.northing,
                minimum_distance: MIN_HEADING_BASELINE_M,
            }));

        match (self.external_heading_rad.take(), travel_heading) {
            (Some(external), travel) => {
                if let Some(t) = travel {
                    self.set_reversing(abs_ang_sep(t, external) > REVERSE_THRESHOLD_RAD);
                }
                self.heading_rad = external;
            },
            (None, Some(t)) => {
                self.set_reversing(abs_ang_sep(t, self.heading_rad) > REVERSE_THRESHOLD_RAD);

                // Report the direction the vehicle faces rather than the
                // direction of the fix to fix vector.
                let facing = if self.is_reversing { wrap_2pi(t + PI) } else { t };

                self.heading_rad = match imu {
                    Some(i) => heading_calc.fuse_imu(facing, i),
                    None => facing
                };
            },
            // Baseline too short, keep the last heading
            (None, None) => ()
        }

        // ---- SPEED ----

        let period_s = 1.0 / self.frequency_hz;
        self.speed_ms = distance_m / period_s;

        // ---- HISTORY ----

        self.history.push(coord);
        self.current_position = coord;

        trace!(
            "Pose: ({:.3}, {:.3}) hdg {:.4} rad, {:.3} m/s, {:.1} Hz",
            coord.easting, coord.northing, self.heading_rad, self.speed_ms, self.frequency_hz
        );

        Some(self.make_update(distance_m))
    }

    fn update_frequency(&mut self, received: Instant) {
        if let Some(last) = self.last_sample {
            let elapsed_s = std_duration_to_seconds(received.saturating_duration_since(last));

            let instant_hz = if elapsed_s > 0.0 {
                1.0 / elapsed_s
            }
            else {
                MAX_FREQUENCY_HZ
            };
            let instant_hz = clamp(&instant_hz, &MIN_FREQUENCY_HZ, &MAX_FREQUENCY_HZ);

            self.frequency_hz = FREQ_FILTER_PREV_WEIGHT * self.frequency_hz
                + FREQ_FILTER_NEW_WEIGHT * instant_hz;
        }

        self.last_sample = Some(received);
    }

    fn set_reversing(&mut self, is_reversing: bool) {
        if is_reversing != self.is_reversing {
            debug!("Direction of travel changed, reversing: {}", is_reversing);
        }
        self.is_reversing = is_reversing;
    }

    fn make_update(&self, distance_travelled: f64) -> PositionUpdate {
        PositionUpdate {
            position: self.current_position,
            heading: self.heading_rad,
            speed: self.speed_ms,
            distance_travelled,
            is_reversing: self.is_reversing,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
