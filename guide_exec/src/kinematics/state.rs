//! Implementations for the Kinematics state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;

// Internal
use super::{
    calc_articulated_pose,
    calc_hitch_position,
    calc_look_ahead_position,
    calc_pivot_position,
    calc_rigid_tool_position,
    calc_steer_axle_position,
    calc_tool_working_position,
    place_behind,
    KinematicsError,
    ToolHitch,
    VehicleParams,
    TANK_JACKKNIFE_THRESHOLD_RAD,
    TOOL_JACKKNIFE_THRESHOLD_RAD
};
use crate::geo::{Position2D, Position3D};
use crate::pos_est::PositionUpdate;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics module state
#[derive(Default)]
pub struct Kinematics {
    pub(crate) params: VehicleParams,

    pub(crate) articulation: ArticulationState,

    pub(crate) report: StatusReport,

    pub(crate) output: Option<VehicleGeometry>,
    arch_geometry: Archiver,
}

/// Poses of the articulated bodies on the previous frame.
///
/// `None` until the body is first placed, at which point it is put directly
/// behind its reference point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArticulationState {
    /// Tool pivot
    pub tool: Option<Position3D>,

    pub tank: Option<Position3D>,
}

/// Every reference point of the vehicle and implement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleGeometry {
    pub pivot: Position3D,
    pub steer_axle: Position3D,
    pub hitch: Position2D,

    /// Only present for a tank between tractor setup.
    pub tank: Option<Position3D>,

    pub tool_pivot: Position3D,
    pub tool_working: Position3D,
    pub look_ahead: Position2D,
}

/// Status report for Kinematics processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// The tool was realigned behind its reference this frame.
    pub tool_jackknifed: bool,

    /// The tank was realigned behind the hitch this frame.
    pub tank_jackknifed: bool,
}

/// Flat archive record of one frame.
#[derive(Serialize)]
struct GeometryRecord {
    time_s: f64,
    pivot_e_m: f64,
    pivot_n_m: f64,
    pivot_h_rad: f64,
    steer_e_m: f64,
    steer_n_m: f64,
    hitch_e_m: f64,
    hitch_n_m: f64,
    tank_e_m: Option<f64>,
    tank_n_m: Option<f64>,
    tank_h_rad: Option<f64>,
    tool_pivot_e_m: f64,
    tool_pivot_n_m: f64,
    tool_pivot_h_rad: f64,
    tool_working_e_m: f64,
    tool_working_n_m: f64,
    look_ahead_e_m: f64,
    look_ahead_n_m: f64,
    tool_jackknifed: bool,
    tank_jackknifed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Kinematics {
    type InitData = &'static str;
    type InitError = KinematicsError;

    type InputData = PositionUpdate;
    type OutputData = VehicleGeometry;
    type StatusReport = StatusReport;
    type ProcError = KinematicsError;

    /// Initialise the Kinematics module.
    ///
    /// Expected init data is the path to the vehicle parameter file.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)
            .map_err(KinematicsError::ParamLoadError)?;

        if let Some(s) = session {
            self.arch_geometry = Archiver::from_path(s, "kinematics/geometry.csv")
                .map_err(KinematicsError::ArchiveError)?;
        }

        self.articulation = ArticulationState::default();
        self.output = None;

        Ok(())
    }

    /// Map the antenna pose onto the rest of the vehicle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if !input_data.position.is_finite() || !input_data.heading.is_finite() {
            return Err(KinematicsError::NonFiniteInput);
        }

        self.report = StatusReport::default();

        let p = &self.params;
        let heading = input_data.heading;
        let distance_m = input_data.distance_travelled;
        let antenna = Position2D::from(input_data.position);

        let pivot = calc_pivot_position(&antenna, heading, p.antenna_pivot_m);
        let steer_axle = calc_steer_axle_position(&pivot, heading, p.wheelbase_m);
        let hitch = calc_hitch_position(
            &antenna, heading, p.hitch_length_m, p.antenna_pivot_m
        );

        let (tank, tool_pivot) = match p.tool_hitch {
            ToolHitch::Rigid => (None, calc_rigid_tool_position(&hitch, heading)),
            ToolHitch::Trailing => {
                let prev_tool = self.articulation.tool.unwrap_or_else(
                    || place_behind(&hitch, heading, p.trailing_hitch_m)
                );
                let tool = calc_articulated_pose(
                    &hitch,
                    heading,
                    &prev_tool,
                    p.trailing_hitch_m,
                    distance_m,
                    TOOL_JACKKNIFE_THRESHOLD_RAD
                );
                self.report.tool_jackknifed = tool.jackknifed;

                (None, tool.pose)
            },
            ToolHitch::TankBetweenTractor => {
                let prev_tank = self.articulation.tank.unwrap_or_else(
                    || place_behind(&hitch, heading, p.tank_hitch_m)
                );
                let tank = calc_articulated_pose(
                    &hitch,
                    heading,
                    &prev_tank,
                    p.tank_hitch_m,
                    distance_m,
                    TANK_JACKKNIFE_THRESHOLD_RAD
                );
                self.report.tank_jackknifed = tank.jackknifed;

                let tank_pos = tank.pose.position_2d();
                let prev_tool = self.articulation.tool.unwrap_or_else(
                    || place_behind(&tank_pos, tank.pose.heading, p.trailing_hitch_m)
                );
                let tool = calc_articulated_pose(
                    &tank_pos,
                    tank.pose.heading,
                    &prev_tool,
                    p.trailing_hitch_m,
                    distance_m,
                    TOOL_JACKKNIFE_THRESHOLD_RAD
                );
                self.report.tool_jackknifed = tool.jackknifed;

                (Some(tank.pose), tool.pose)
            }
        };

        let tool_working = calc_tool_working_position(&tool_pivot, p.tool_to_pivot_m);
        let look_ahead = calc_look_ahead_position(
            &pivot, heading, p.tool_width_m, input_data.speed, p.look_ahead_time_s
        );

        if self.report.tool_jackknifed {
            warn!("Tool jackknifed, realigned behind its hitch");
        }
        if self.report.tank_jackknifed {
            warn!("Tank jackknifed, realigned behind the hitch");
        }

        // Rigid tools don't articulate, so there is no state to carry
        if p.tool_hitch != ToolHitch::Rigid {
            self.articulation.tool = Some(tool_pivot);
        }
        self.articulation.tank = tank;

        let output = VehicleGeometry {
            pivot,
            steer_axle,
            hitch,
            tank,
            tool_pivot,
            tool_working,
            look_ahead,
        };

        trace!("Kinematics output: {:?}", output);

        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for Kinematics {
    /// Write the last frame, if any, to the archive.
    ///
    /// Does nothing if the module was initialised without a session.
    fn write(&mut self) -> Result<(), ArchiveError> {
        if !self.arch_geometry.is_initialised() {
            return Ok(());
        }

        let o = match self.output {
            Some(o) => o,
            None => return Ok(())
        };

        self.arch_geometry.serialise(GeometryRecord {
            time_s: session::get_elapsed_seconds(),
            pivot_e_m: o.pivot.easting,
            pivot_n_m: o.pivot.northing,
            pivot_h_rad: o.pivot.heading,
            steer_e_m: o.steer_axle.easting,
            steer_n_m: o.steer_axle.northing,
            hitch_e_m: o.hitch.easting,
            hitch_n_m: o.hitch.northing,
            tank_e_m: o.tank.map(|t| t.easting),
            tank_n_m: o.tank.map(|t| t.northing),
            tank_h_rad: o.tank.map(|t| t.heading),
            tool_pivot_e_m: o.tool_pivot.easting,
            tool_pivot_n_m: o.tool_pivot.northing,
            tool_pivot_h_rad: o.tool_pivot.heading,
            tool_working_e_m: o.tool_working.easting,
            tool_working_n_m: o.tool_working.northing,
            look_ahead_e_m: o.look_ahead.easting,
            look_ahead_n_m: o.look_ahead.northing,
            tool_jackknifed: self.report.tool_jackknifed,
            tank_jackknifed: self.report.tank_jackknifed,
        })
    }
}

impl Kinematics {
    /// Create a module from already loaded parameters, without archiving.
    pub fn with_params(params: VehicleParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn articulation(&self) -> ArticulationState {
        self.articulation
    }

    /// Forget the articulated bodies' poses, they will be placed directly
    /// behind their references on the next frame.
    pub fn reset_articulation(&mut self) {
        self.articulation = ArticulationState::default();
    }
}
