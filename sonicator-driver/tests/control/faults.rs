use core::time::Duration;

use sonicator_core::{
    fault::FaultMask,
    registers::{params as regmap, StatusFlags},
    state::UnitState,
};
use sonicator_driver::params;

use crate::{Bench, TICK};

fn running_bench() -> Bench {
    let mut bench = Bench::new(1);
    bench.set_lock(0, true);
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));
    bench
}

#[test]
fn overload_faults_and_resets_via_registers() {
    let mut bench = running_bench();
    let base = regmap::unit_base(0);

    bench.set_overload(0, true);
    bench.tick_for(params::OVERLOAD_DEBOUNCE + TICK);
    assert_eq!(UnitState::Fault, bench.state(0));

    bench.tick_for(params::PUBLISH_INTERVAL);
    assert_eq!(
        FaultMask::OVERLOAD.bits(),
        bench.read(base + regmap::REG_UNIT_FAULT_MASK)
    );
    let flags = StatusFlags::from_bits_truncate(bench.read(base + regmap::REG_UNIT_STATUS_FLAGS));
    assert!(flags.contains(StatusFlags::FAULT | StatusFlags::OVERLOAD));
    assert!(!flags.contains(StatusFlags::RUNNING));

    // the master acknowledges: start level off, reset request on
    bench.set_overload(0, false);
    bench.master_write(base + regmap::REG_UNIT_START_STOP, 0);
    bench.master_write(base + regmap::REG_UNIT_OVERLOAD_RESET, 1);
    bench.tick();
    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(0, bench.read(base + regmap::REG_UNIT_OVERLOAD_RESET));
    assert_eq!(1, bench.coordinator.status(0).unwrap().fault_count());

    bench.tick_for(params::PUBLISH_INTERVAL);
    assert_eq!(0, bench.read(base + regmap::REG_UNIT_FAULT_MASK));
}

#[test]
fn start_level_restarts_after_overload_reset() {
    let mut bench = running_bench();

    bench.set_overload(0, true);
    bench.tick_for(params::OVERLOAD_DEBOUNCE + TICK);
    assert_eq!(UnitState::Fault, bench.state(0));

    // master leaves the start level set and only pulses the reset
    bench.set_overload(0, false);
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_OVERLOAD_RESET, 1);
    bench.tick();
    assert_eq!(UnitState::Starting, bench.state(0));

    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));
    assert_eq!(2, bench.coordinator.status(0).unwrap().start_count());
}

#[test]
fn comm_timeout_faults_and_recovers() {
    let mut bench = Bench::new(1);

    // one write arms the freshness check
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 0);
    bench.tick_for(params::COMM_TIMEOUT + Duration::from_millis(50));
    assert_eq!(UnitState::Fault, bench.state(0));
    assert_eq!(
        FaultMask::COMM_TIMEOUT,
        bench.coordinator.unit(0).unwrap().faults()
    );

    // the next write clears it without an explicit reset
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 0);
    bench.tick();
    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(
        FaultMask::NONE,
        bench.coordinator.unit(0).unwrap().faults()
    );
}

#[test]
fn missed_ticks_trip_the_watchdog() {
    let mut bench = Bench::new(1);
    bench.tick();

    // the control task stalls for two seconds
    bench.coordinator.board_mut().advance(Duration::from_secs(2));
    bench.coordinator.tick(&mut bench.bridge);
    assert_eq!(UnitState::Fault, bench.state(0));
    assert!(bench
        .coordinator
        .unit(0)
        .unwrap()
        .faults()
        .contains(FaultMask::WATCHDOG_EXPIRED));

    // ticks resume on time and the fault clears itself
    bench.tick();
    assert_eq!(UnitState::Idle, bench.state(0));
}

#[test]
fn lock_loss_faults_only_running_units() {
    let mut bench = Bench::new(2);
    bench.set_lock(0, true);

    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);
    bench.tick();
    bench.tick_for(params::START_DELAY);
    assert_eq!(UnitState::Running, bench.state(0));

    // unit 1 sits idle without lock the whole time, which is fine
    assert_eq!(UnitState::Idle, bench.state(1));
    assert_eq!(FaultMask::NONE, bench.coordinator.unit(1).unwrap().faults());

    bench.set_lock(0, false);
    bench.tick();
    assert_eq!(UnitState::Fault, bench.state(0));
    assert_eq!(
        FaultMask::FREQUENCY_UNLOCK,
        bench.coordinator.status(0).unwrap().last_fault()
    );

    // out of the running state the condition clears itself
    bench.tick();
    assert_eq!(UnitState::Idle, bench.state(0));
    assert_eq!(1, bench.coordinator.status(0).unwrap().fault_count());
}

#[test]
fn start_with_standing_fault_never_reaches_running() {
    let mut bench = Bench::new(1);
    bench.set_lock(0, true);
    bench.set_overload(0, true);
    bench.master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1);

    let mut saw_running = false;
    for _ in 0..40 {
        bench.tick();
        saw_running |= bench.state(0) == UnitState::Running;
    }
    assert!(!saw_running);
    assert_eq!(UnitState::Fault, bench.state(0));
}
