//! # Kinematics Benchmark

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use guide_lib::{
    geo::{GeoCoord, Position2D, Position3D},
    kinematics::{
        calc_hitch_position, calc_pivot_position, calc_steer_axle_position,
        calc_trailing_tool_position, Kinematics, ToolHitch, VehicleParams,
    },
    pos_est::{GpsData, Params, PosEst, PositionUpdate},
};
use util::module::State;

fn kinematics_benchmark(c: &mut Criterion) {
    // ---- Pure transforms ----

    let antenna = Position2D::new(652_341.2, 5_786_120.7);
    let heading = 0.7;

    c.bench_function("kinematics::rigid_chain", |b| {
        b.iter(|| {
            let pivot = calc_pivot_position(black_box(&antenna), black_box(heading), 1.2);
            let steer = calc_steer_axle_position(&pivot, heading, 2.8);
            let hitch = calc_hitch_position(&antenna, heading, -1.6, 1.2);
            (steer, hitch)
        })
    });

    let hitch = Position2D::new(0.0, 0.0);
    let prev_tool = Position3D::new(0.3, -3.0, 0.1);

    c.bench_function("kinematics::calc_trailing_tool_position", |b| {
        b.iter(|| calc_trailing_tool_position(
            black_box(&hitch), black_box(&prev_tool), 3.0, 0.2, 0.0, None
        ))
    });

    // ---- Full module, tank between tractor ----

    let mut kin = Kinematics::with_params(VehicleParams {
        antenna_pivot_m: 1.2,
        wheelbase_m: 2.8,
        hitch_length_m: -1.6,
        tool_hitch: ToolHitch::TankBetweenTractor,
        trailing_hitch_m: 3.0,
        tank_hitch_m: 4.5,
        tool_to_pivot_m: 1.0,
        tool_width_m: 12.0,
        look_ahead_time_s: 2.0,
    });

    let mut northing = 0.0;

    c.bench_function("Kinematics::proc", |b| {
        b.iter(|| {
            northing += 0.2;
            kin.proc(&PositionUpdate {
                position: GeoCoord::new(0.0, northing, 0.0),
                heading: 0.0,
                speed: 2.0,
                distance_travelled: 0.2,
                is_reversing: false,
                timestamp: Utc::now(),
            }).unwrap()
        })
    });

    // ---- Estimator ----

    let est = PosEst::new(&Params::default());
    let mut easting = 0.0;

    c.bench_function("PosEst::process_gps_position", |b| {
        b.iter(|| {
            easting += 0.3;
            est.process_gps_position(&GpsData::at(easting, 0.0), None).unwrap()
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
