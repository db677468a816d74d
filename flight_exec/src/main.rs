//! Main flight executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logger
//!     - Load parameters
//!     - Start trajectory control with a sink driving the flight interface
//!     - Fly the demonstration flight plan
//!     - Shut down, holding position
//!
//! No real flight interface is wired in yet, the sink logs the commands it
//! would deliver. Replacing the sink with one backed by the platform's
//! velocity API is all that is needed to fly for real.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info};
use std::time::Duration;

// Internal
use flight_lib::pose::Pose;
use flight_lib::traj_ctrl::{PathOutcome, TrajCtrl};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum time to wait for any single demonstration path to resolve.
const PATH_TIMEOUT_S: u64 = 30;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "flight_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution
    info!("Icarus Flight Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TRAJECTORY CONTROL ----

    // The sink stands in for the flight interface, logging each command it
    // would deliver to the platform.
    let sink = Box::new(|cmd: Pose| {
        debug!(
            "Velocity demand: x {:.3}, y {:.3}, z {:.3}, yaw {:.3} deg/s",
            cmd.x, cmd.y, cmd.z, cmd.yaw_deg
        );
    });

    let traj_ctrl = TrajCtrl::from_file("traj_ctrl.toml", sink)
        .wrap_err("Failed to initialise trajectory control")?;

    info!("TrajCtrl parameters loaded");

    // ---- DEMONSTRATION FLIGHT PLAN ----

    // Begin a slow climb, then replace it with the flight plan proper to
    // demonstrate that a newer path supersedes the old one cleanly
    let climb = traj_ctrl.start(Pose::new(0.0, 0.0, 10.0, 0.0), 60_000.0);
    std::thread::sleep(Duration::from_millis(500));

    // Fly a short square at constant altitude with a turn at each corner
    let waypoints = [
        Pose::new(2.0, 0.0, 1.0, 0.0),
        Pose::new(2.0, 2.0, 1.0, 90.0),
        Pose::new(0.0, 2.0, 1.0, 180.0),
        Pose::new(0.0, 0.0, 1.0, -90.0)
    ];

    for (i, waypoint) in waypoints.iter().enumerate() {
        info!("Flying leg {} to {:?}", i + 1, waypoint);

        let handle = traj_ctrl.start(*waypoint, 5000.0);

        if i == 0 {
            info!("Climb path resolved: {:?}", climb.outcome());
        }

        match handle.wait_timeout(Duration::from_secs(PATH_TIMEOUT_S)) {
            Some(PathOutcome::Completed) => {
                let report = traj_ctrl.status_report();
                info!(
                    "Leg {} complete after {} ticks, target {:?}",
                    i + 1,
                    report.tick_count,
                    report.target
                );
            }
            Some(outcome) => {
                info!("Leg {} ended early: {:?}", i + 1, outcome);
                break
            }
            None => {
                info!("Leg {} timed out, stopping", i + 1);
                traj_ctrl.stop();
                break
            }
        }
    }

    // ---- SHUTDOWN ----

    traj_ctrl.stop();

    let report = traj_ctrl.status_report();
    info!(
        "Flight plan finished: target {:?}, {} ticks executed",
        report.target, report.tick_count
    );

    Ok(())
}
