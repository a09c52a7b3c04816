use std::sync::Arc;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rover_core::mocks::{ScriptedEncoders, SpyMotors};
use rover_core::{MovingAverage, RelativeEncoder, Robot, RobotCfg, Speedometer};
use rover_traits::ManualClock;

fn bench_relative_encoder(c: &mut Criterion) {
    let enc = RelativeEncoder::new(i16::MAX - 100);
    c.bench_function("relative_encoder_calculate", |b| {
        b.iter(|| {
            let mut acc = 0i32;
            for step in (i16::MIN..i16::MIN + 1024).step_by(7) {
                acc += i32::from(enc.calculate(black_box(step)));
            }
            black_box(acc)
        });
    });
}

fn bench_moving_average(c: &mut Criterion) {
    let mut avg = MovingAverage::<i32, 32>::new();
    let mut x = 0i32;
    c.bench_function("moving_average_write_32", |b| {
        b.iter(|| {
            x = x.wrapping_add(37) % 5000;
            black_box(avg.write(black_box(x)))
        });
    });
}

fn bench_speedometer(c: &mut Criterion) {
    let clock = ManualClock::new();
    let enc = ScriptedEncoders::new(0, 0);
    let motors = SpyMotors::new(400);
    motors.force_speeds(200, -200);
    let mut speedo = Speedometer::new(Arc::new(clock.clone()), &RobotCfg::default(), &enc);
    c.bench_function("speedometer_process", |b| {
        b.iter(|| {
            clock.advance_ms(1);
            enc.advance(3, -3);
            speedo.process(&enc, &motors);
            black_box(speedo.speed_center())
        });
    });
}

fn bench_robot_tick(c: &mut Criterion) {
    c.bench_function("robot_tick_calibration_1000", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::new();
                let robot = Robot::builder()
                    .with_encoders(ScriptedEncoders::new(0, 0))
                    .with_motors(SpyMotors::new(400))
                    .with_clock(Arc::new(clock.clone()))
                    .build()
                    .unwrap();
                (robot, clock)
            },
            |(mut robot, clock)| {
                for _ in 0..1000 {
                    clock.advance_ms(1);
                    robot.tick();
                }
                black_box(robot.state())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_relative_encoder,
    bench_moving_average,
    bench_speedometer,
    bench_robot_tick
);
criterion_main!(benches);
