use sonicator_core::{common::Amplitude, registers::params as regmap, state::UnitState};
use sonicator_driver::params;

use crate::{Bench, AMPLITUDE_PWM, INDICATOR};

#[test]
fn amplitude_follows_most_recent_writer() {
    let mut bench = Bench::new(2);
    bench.master_write(regmap::ADDR_GLOBAL_ENABLE, 1);
    bench.master_write(regmap::ADDR_GLOBAL_AMPLITUDE, 50);
    bench.tick();
    assert_eq!(
        Amplitude::clamped(50).duty(),
        bench.coordinator.board().duty(AMPLITUDE_PWM)
    );

    // a per-unit register write moves the shared line
    bench.master_write(regmap::unit_base(1) + regmap::REG_UNIT_AMPLITUDE, 90);
    bench.tick();
    assert_eq!(
        Amplitude::clamped(90).duty(),
        bench.coordinator.board().duty(AMPLITUDE_PWM)
    );

    // so does the local call
    bench.coordinator.set_amplitude(60);
    assert_eq!(
        Amplitude::clamped(60).duty(),
        bench.coordinator.board().duty(AMPLITUDE_PWM)
    );

    // an unchanged register level does not override it
    bench.tick();
    assert_eq!(
        Amplitude::clamped(60).duty(),
        bench.coordinator.board().duty(AMPLITUDE_PWM)
    );

    bench.tick_for(params::PUBLISH_INTERVAL);
    assert_eq!(60, bench.read(regmap::ADDR_AMPLITUDE_ACTUAL));
    assert_eq!(
        60,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_AMPLITUDE_ACTUAL)
    );
}

#[test]
fn enable_gates_the_shared_line() {
    let mut bench = Bench::new(1);
    bench.master_write(regmap::ADDR_GLOBAL_AMPLITUDE, 80);
    bench.tick();
    assert_eq!(0, bench.coordinator.board().duty(AMPLITUDE_PWM));

    bench.master_write(regmap::ADDR_GLOBAL_ENABLE, 1);
    bench.tick();
    assert_eq!(
        Amplitude::clamped(80).duty(),
        bench.coordinator.board().duty(AMPLITUDE_PWM)
    );

    bench.master_write(regmap::ADDR_GLOBAL_ENABLE, 0);
    bench.tick();
    assert_eq!(0, bench.coordinator.board().duty(AMPLITUDE_PWM));
}

#[test]
fn register_emergency_stop_stops_everything_in_one_tick() {
    let mut bench = Bench::new(2);
    bench.set_lock(0, true);
    bench.set_lock(1, true);
    bench.master_write(regmap::ADDR_GLOBAL_ENABLE, 1);
    bench.master_write(regmap::ADDR_GLOBAL_AMPLITUDE, 70);
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.master_write(regmap::unit_base(1) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));
    assert_eq!(UnitState::Running, bench.state(1));
    assert!(bench.coordinator.board().output(INDICATOR));

    bench.master_write(regmap::ADDR_ESTOP, 1);
    bench.tick();

    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(UnitState::Idle, bench.state(1));
    assert_eq!(0, bench.coordinator.board().duty(AMPLITUDE_PWM));
    assert!(!bench.coordinator.board().output(INDICATOR));
    assert_eq!(0, bench.read(regmap::ADDR_ESTOP));
    assert_eq!(0, bench.read(regmap::ADDR_GLOBAL_ENABLE));
    assert_eq!(
        0,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP)
    );

    // nothing restarts on the following ticks
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(UnitState::Idle, bench.state(1));
}
