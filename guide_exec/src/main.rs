//! Main guidance executable entry point.
//!
//! # Architecture
//!
//! The executable replays a recorded GPS/IMU sample log through the
//! guidance chain:
//!
//!     - Initialise session, logging and modules
//!     - Main loop:
//!         - Acquire the samples due at the current replay time
//!         - Position estimation
//!         - For each position update:
//!             - Kinematics processing
//!             - Archiving
//!
//! # Usage
//!
//!     guide_exec <samples.csv>

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, error, info, warn};
use std::env;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use guide_lib::{
    data_store::DataStore,
    params::GuideExecParams,
    pos_est::{self, PosEst, PosEstError, PositionUpdate},
    replay::{PendingSamples, Replay, Sample},
};
use util::{
    archive::Archived,
    host,
    logger::logger_init,
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        return Err(eyre!(
            "Expected one argument (the sample log path), found {}", args.len() - 1
        ));
    }

    // Initialise session
    let session = Session::new(
        "guide_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    let exec_params: GuideExecParams = util::params::load(
        "guide_exec.toml"
    ).wrap_err("Could not load exec params")?;
    exec_params.validate()
        .wrap_err("Invalid exec params")?;

    // Initialise logger
    logger_init(&exec_params.logger, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Guidance Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Exec parameters: {:?}", exec_params);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let pos_est_params: pos_est::Params = util::params::load("pos_est.toml")
        .wrap_err("Could not load the position estimator params")?;
    let pos_est = PosEst::new(&pos_est_params);
    let updates = pos_est.subscribe_channel()
        .wrap_err("Failed to subscribe to position updates")?;
    info!("PosEst init complete");

    let mut ds = DataStore::default();

    ds.kinematics.init("vehicle.toml", Some(&session))
        .wrap_err("Failed to initialise Kinematics")?;
    info!("Kinematics init complete ({:?} tool)", ds.kinematics.params().tool_hitch);

    ds.init_archives(&session)
        .wrap_err("Failed to initialise the archives")?;

    info!("Module initialisation complete\n");

    // ---- LOAD REPLAY ----

    info!("Loading samples from \"{}\"", &args[1]);

    let mut replay = Replay::new(&args[1])
        .wrap_err("Failed to load the sample log")?;

    info!(
        "Loaded log lasts {:.02} s and contains {} samples\n",
        replay.duration_s(),
        replay.num_samples()
    );

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let replay_start = Instant::now();
    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        let cycle_start_instant = Instant::now();

        let replay_time_s = match exec_params.realtime {
            true => replay_start.elapsed().as_secs_f64(),
            false => f64::INFINITY
        };

        let samples = match replay.get_pending(replay_time_s) {
            PendingSamples::None => vec![],
            PendingSamples::Some(s) => s,
            PendingSamples::EndOfReplay => {
                info!("End of sample log reached, stopping");
                break
            }
        };

        for sample in samples.iter() {
            process_sample(&pos_est, &updates, &mut ds, replay_start, sample)?;
        }

        // ---- CYCLE MANAGEMENT ----

        if exec_params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    info!(
        "Processed {} position updates, {} samples rejected",
        ds.num_updates,
        ds.num_rejected_samples
    );
    info!(
        "Final pose: {:?}, heading {:.03} rad, speed {:.02} m/s",
        pos_est.get_current_position()?,
        pos_est.get_current_heading()?,
        pos_est.get_current_speed()?
    );
    info!("End of execution");

    Ok(())
}

/// Feed one sample to the estimator and run the rest of the chain on the
/// resulting update, if any.
fn process_sample(
    pos_est: &PosEst,
    updates: &Receiver<PositionUpdate>,
    ds: &mut DataStore,
    replay_start: Instant,
    sample: &Sample
) -> Result<(), Report> {
    let received = match Duration::try_from_secs_f64(sample.time_s)
        .ok()
        .and_then(|d| replay_start.checked_add(d))
    {
        Some(r) => r,
        None => {
            warn!("Sample at {} s is beyond the replay clock, rejected", sample.time_s);
            ds.num_rejected_samples += 1;
            return Ok(())
        }
    };

    match pos_est.process_gps_position_at(&sample.gps, sample.imu.as_ref(), received) {
        Ok(_) => (),
        Err(PosEstError::InvalidArgument(e)) => {
            warn!("Sample at {:.03} s rejected: {}", sample.time_s, e);
            ds.num_rejected_samples += 1;
            return Ok(())
        },
        Err(e) => return Err(e).wrap_err("Position estimation failed")
    }

    for update in updates.try_iter() {
        ds.cycle_start(sample.time_s);
        ds.pos_update = Some(update);
        ds.num_updates += 1;

        debug!(
            "Update {}: ({:.03}, {:.03}) heading {:.03} rad, {:.02} m/s{}",
            ds.num_updates,
            update.position.easting,
            update.position.northing,
            update.heading,
            update.speed,
            if update.is_reversing { ", reversing" } else { "" }
        );

        // ---- KINEMATICS PROCESSING ----

        let result = ds.kinematics.proc(&update);
        if ds.kin_result(result) {
            error!("Too many consecutive kinematics errors");
            return Err(eyre!(
                "{} consecutive kinematics errors", ds.num_consec_kin_errors
            ));
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.write() {
            warn!("Could not write archives: {}", e);
        }
    }

    Ok(())
}
