use std::sync::Arc;

use rover_core::{CalibrationPhase, Robot, RoverError, SpeedBounds, StateId};
use rover_hardware::{SimParams, SimulatedDrive};
use rover_traits::ManualClock;
use rstest::rstest;

fn sim_robot(params: SimParams) -> (Robot, SimulatedDrive, ManualClock) {
    let clock = ManualClock::new();
    let shared = Arc::new(clock.clone());
    let drive = SimulatedDrive::new(params, shared.clone()).unwrap();
    let robot = Robot::builder()
        .with_encoders(drive.encoders())
        .with_motors(drive.motors())
        .with_clock(shared)
        .build()
        .unwrap();
    (robot, drive, clock)
}

/// Tick at 1 ms until calibration has been left or `max_ticks` elapsed.
fn run_calibration(robot: &mut Robot, clock: &ManualClock, max_ticks: u32) -> Vec<CalibrationPhase> {
    let mut phases = vec![robot.calibration_phase()];
    for _ in 0..max_ticks {
        clock.advance_ms(1);
        robot.tick();
        if phases.last() != Some(&robot.calibration_phase()) {
            phases.push(robot.calibration_phase());
        }
        if matches!(robot.state(), Some(StateId::Ready | StateId::Error)) {
            break;
        }
    }
    phases
}

#[test]
fn phases_are_strictly_linear() {
    let (mut robot, _drive, clock) = sim_robot(SimParams::default());
    let phases = run_calibration(&mut robot, &clock, 5_000);
    assert_eq!(
        phases,
        vec![
            CalibrationPhase::Wait,
            CalibrationPhase::DriveBackwardFull,
            CalibrationPhase::DriveForwardFull,
            CalibrationPhase::Finished,
        ]
    );
    assert_eq!(robot.state(), Some(StateId::Ready));
}

#[test]
fn phase_timing_follows_configured_durations() {
    let (mut robot, _drive, clock) = sim_robot(SimParams::default());
    // First tick enters calibration and starts the 1000 ms wait.
    clock.advance_ms(1);
    robot.tick();
    assert_eq!(robot.state(), Some(StateId::MotorSpeedCalibration));

    for _ in 0..999 {
        clock.advance_ms(1);
        robot.tick();
    }
    assert_eq!(robot.calibration_phase(), CalibrationPhase::Wait);
    clock.advance_ms(1);
    robot.tick();
    assert_eq!(robot.calibration_phase(), CalibrationPhase::DriveBackwardFull);

    for _ in 0..999 {
        clock.advance_ms(1);
        robot.tick();
    }
    assert_eq!(robot.calibration_phase(), CalibrationPhase::DriveBackwardFull);
    assert!(robot.speed_left() < 0);
    clock.advance_ms(1);
    robot.tick();
    assert_eq!(robot.calibration_phase(), CalibrationPhase::DriveForwardFull);
}

#[rstest]
#[case(3000, 3000, 3000)]
#[case(2000, 3000, 2000)]
#[case(3000, 1000, 1000)]
fn max_speed_is_slowest_wheel(#[case] left: i32, #[case] right: i32, #[case] expected: i16) {
    let (mut robot, _drive, clock) = sim_robot(SimParams {
        left_steps_per_sec: left,
        right_steps_per_sec: right,
        ..SimParams::default()
    });
    run_calibration(&mut robot, &clock, 5_000);

    assert_eq!(robot.state(), Some(StateId::Ready));
    let cal = robot.calibration().copied().unwrap();
    let bounds = SpeedBounds {
        left: i16::try_from(left).unwrap(),
        right: i16::try_from(right).unwrap(),
    };
    assert_eq!(cal.backward, bounds);
    assert_eq!(cal.forward, bounds);
    assert_eq!(cal.max_motor_speed(), expected);
}

#[test]
fn motors_stopped_after_calibration() {
    let (mut robot, drive, clock) = sim_robot(SimParams::default());
    run_calibration(&mut robot, &clock, 5_000);
    let before = drive.encoders();
    let counts = (
        rover_traits::Encoders::counts_left(&before),
        rover_traits::Encoders::counts_right(&before),
    );
    for _ in 0..50 {
        clock.advance_ms(1);
        robot.tick();
    }
    assert_eq!(
        counts,
        (
            rover_traits::Encoders::counts_left(&before),
            rover_traits::Encoders::counts_right(&before),
        )
    );
    assert_eq!(robot.speed_center(), 0);
}

#[test]
fn mileage_covers_both_drives() {
    let (mut robot, _drive, clock) = sim_robot(SimParams::default());
    run_calibration(&mut robot, &clock, 5_000);
    for _ in 0..10 {
        clock.advance_ms(1);
        robot.tick();
    }
    // 3000 steps backward + 3000 forward, 8 steps per mm.
    assert_eq!(robot.mileage().steps_left(), 6000);
    assert_eq!(robot.mileage_center(), 750);
}

#[test]
fn calibrates_across_counter_wraparound() {
    let (mut robot, drive, clock) = sim_robot(SimParams::default());
    drive.set_counts(i16::MIN + 1000, i16::MAX - 1000);
    robot.clear_mileage();
    run_calibration(&mut robot, &clock, 5_000);
    assert_eq!(
        robot.calibration().map(|c| c.max_motor_speed()),
        Some(3000)
    );
}

#[test]
fn stalled_wheel_ends_in_error() {
    let (mut robot, _drive, clock) = sim_robot(SimParams {
        right_steps_per_sec: 0,
        ..SimParams::default()
    });
    let phases = run_calibration(&mut robot, &clock, 5_000);
    assert_eq!(phases.last(), Some(&CalibrationPhase::Finished));
    assert_eq!(robot.state(), Some(StateId::Error));
    assert!(matches!(robot.fault(), Some(RoverError::Calibration(_))));
    assert_eq!(robot.calibration().map(|c| c.max_motor_speed()), Some(0));
}

#[test]
fn motor_fault_routes_to_error_and_recalibration_recovers() {
    let (mut robot, drive, clock) = sim_robot(SimParams::default());
    for _ in 0..500 {
        clock.advance_ms(1);
        robot.tick();
    }
    drive.fail_commands("driver fault");
    run_calibration(&mut robot, &clock, 5_000);
    assert_eq!(robot.state(), Some(StateId::Error));
    assert!(matches!(robot.fault(), Some(RoverError::HardwareFault(_))));
    // Aborted before the backward drive was measured.
    assert!(robot.calibration().is_none());

    drive.heal();
    robot.request_recalibration();
    clock.advance_ms(1);
    robot.tick();
    assert_eq!(robot.state(), Some(StateId::MotorSpeedCalibration));
    assert!(robot.fault().is_none());

    run_calibration(&mut robot, &clock, 5_000);
    assert_eq!(robot.state(), Some(StateId::Ready));
    assert_eq!(robot.calibration().map(|c| c.max_motor_speed()), Some(3000));
}
