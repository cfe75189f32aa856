use core::time::Duration;

use sonicator_core::{
    registers::{params as regmap, StatusFlags},
    state::UnitState,
};
use sonicator_driver::params;

use crate::{channel_config, Bench};

#[test]
fn register_driven_lifecycle() {
    let mut bench = Bench::new(2);
    bench.set_lock(0, true);

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    assert_eq!(UnitState::Starting, bench.state(0));
    assert_eq!(UnitState::Idle, bench.state(1));

    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));

    bench.tick_for(params::PUBLISH_INTERVAL);
    let flags = StatusFlags::from_bits_truncate(
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_STATUS_FLAGS),
    );
    assert!(flags.contains(StatusFlags::RUNNING | StatusFlags::FREQ_LOCK));
    assert!(!flags.contains(StatusFlags::FAULT));

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 0);
    bench.tick();
    assert_eq!(UnitState::Stopping, bench.state(0));

    bench.tick_for(params::STOP_DELAY);
    assert_eq!(UnitState::Idle, bench.state(0));

    bench.tick_for(params::PUBLISH_INTERVAL);
    assert_eq!(0, bench.read(regmap::ADDR_RUNNING_MASK));
    assert_eq!(
        1,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_START_COUNT)
    );
}

#[test]
fn runtime_and_start_count_accumulate() {
    let mut bench = Bench::new(1);
    bench.set_lock(0, true);

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));

    // run for 1.5 s, refreshing the start level like a polling master
    for _ in 0..3 {
        bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
        bench.tick_for(Duration::from_millis(500));
    }
    assert_eq!(UnitState::Running, bench.state(0));

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 0);
    bench.tick();
    bench.tick_for(params::STOP_DELAY);
    bench.tick_for(params::PUBLISH_INTERVAL);

    assert_eq!(
        1,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_RUNTIME_LO)
    );
    assert_eq!(
        0,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_RUNTIME_HI)
    );
    assert_eq!(
        1,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_START_COUNT)
    );
}

#[test]
fn units_run_independently() {
    let mut bench = Bench::new(2);
    bench.set_lock(1, true);

    bench.master_write(regmap::unit_base(1) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);

    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(UnitState::Running, bench.state(1));

    bench.tick_for(params::PUBLISH_INTERVAL);
    assert_eq!(0b10, bench.read(regmap::ADDR_RUNNING_MASK));
    assert_eq!(1, bench.read(regmap::ADDR_RUNNING_COUNT));
}

#[test]
fn telemetry_reflects_measurements() {
    let mut bench = Bench::new(1);
    bench.set_lock(0, true);
    bench
        .coordinator
        .board_mut()
        .set_adc(channel_config(0).power_channel, 511);

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));

    // enough nominal signal to cover full sampling windows
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    for _ in 0..25 {
        bench.tick_with_nominal_signal(0);
    }
    bench.tick_for(params::PUBLISH_INTERVAL);

    assert_eq!(
        20_000,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_FREQUENCY)
    );
    assert_eq!(
        999,
        bench.read(regmap::unit_base(0) + regmap::REG_UNIT_POWER_WATTS)
    );
}
