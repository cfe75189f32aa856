use core::time::Duration;

use sonicator_core::{
    common::{Amplitude, Instant},
    registers::{params as regmap, RegisterBank},
    state::UnitState,
};

use crate::{
    params,
    unit::{SonicatorUnit, UnitCommand},
};

/// Global controls taken from the register map at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalCommand {
    /// An emergency stop request was consumed from the register map.
    pub emergency_stop: bool,
    /// Global output gate level.
    pub enable: bool,
    /// Shared amplitude setpoint, already clamped.
    pub amplitude: Amplitude,
    /// The amplitude register changed since the previous intake.
    pub amplitude_changed: bool,
}

/// Two-way adapter between the register map and the control core.
///
/// Intake runs every tick: levels are read as they stand, write-one-to-clear
/// requests are consumed so they act exactly once. Publication refreshes the
/// status registers at a bounded cadence so transport polling never observes
/// a half-written snapshot older than the publish interval.
pub struct RegisterBridge<R> {
    bank: R,
    publish_interval: Duration,
    last_publish: Option<Instant>,
    last_apply: Option<Instant>,
    seen_global_amplitude: u16,
    seen_unit_amplitude: [u16; params::MAX_UNITS],
}

impl<R: RegisterBank> RegisterBridge<R> {
    /// Wraps `bank` with the default publish cadence.
    #[must_use]
    pub fn new(bank: R) -> Self {
        Self {
            bank,
            publish_interval: params::PUBLISH_INTERVAL,
            last_publish: None,
            last_apply: None,
            seen_global_amplitude: 0,
            seen_unit_amplitude: [0; params::MAX_UNITS],
        }
    }

    /// Sets the publish cadence.
    #[must_use]
    pub fn with_publish_interval(mut self, publish_interval: Duration) -> Self {
        self.publish_interval = publish_interval;
        self
    }

    /// Reads the global control registers, consuming the emergency stop
    /// request if one is pending.
    ///
    /// An emergency stop also clears the enable and start/stop levels, so
    /// nothing restarts until the master writes them again.
    pub fn intake_global(&mut self, now: Instant) -> GlobalCommand {
        let emergency_stop = self.bank.read(regmap::ADDR_ESTOP) != 0;
        if emergency_stop {
            self.bank.write(regmap::ADDR_ESTOP, 0);
            self.bank.write(regmap::ADDR_GLOBAL_ENABLE, 0);
            for index in 0..params::MAX_UNITS {
                self.bank
                    .write(regmap::unit_base(index) + regmap::REG_UNIT_START_STOP, 0);
            }
            tracing::warn!("emergency stop request consumed, run levels cleared");
        }

        let enable = self.bank.read(regmap::ADDR_GLOBAL_ENABLE) != 0;

        let raw = self.bank.read(regmap::ADDR_GLOBAL_AMPLITUDE);
        let amplitude_changed = raw != self.seen_global_amplitude;
        self.seen_global_amplitude = raw;

        self.last_apply = Some(now);
        GlobalCommand {
            emergency_stop,
            enable,
            amplitude: Amplitude::clamped(raw.min(u8::MAX as u16) as u8),
            amplitude_changed,
        }
    }

    /// Reads the control block of unit `index`, consuming the overload
    /// reset request if one is pending.
    pub fn intake_unit(&mut self, index: usize, now: Instant) -> UnitCommand {
        let base = regmap::unit_base(index);

        let run = self.bank.read(base + regmap::REG_UNIT_START_STOP) != 0;

        let raw = self.bank.read(base + regmap::REG_UNIT_AMPLITUDE);
        let amplitude_changed = self
            .seen_unit_amplitude
            .get(index)
            .is_some_and(|&seen| seen != raw);
        if let Some(seen) = self.seen_unit_amplitude.get_mut(index) {
            *seen = raw;
        }

        let reset_overload = self.bank.read(base + regmap::REG_UNIT_OVERLOAD_RESET) != 0;
        if reset_overload {
            self.bank.write(base + regmap::REG_UNIT_OVERLOAD_RESET, 0);
            tracing::debug!(unit = index, "overload reset request consumed");
        }

        self.last_apply = Some(now);
        UnitCommand {
            run,
            amplitude: Amplitude::clamped(raw.min(u8::MAX as u16) as u8),
            amplitude_changed,
            reset_overload,
            last_external_write: self.bank.last_external_write(),
        }
    }

    /// Refreshes the status registers from `units`, at most once per publish
    /// interval. Calls in between return without touching the bank.
    pub fn publish(&mut self, units: &[SonicatorUnit], amplitude: Amplitude, now: Instant) {
        if self
            .last_publish
            .is_some_and(|last| now.duration_since(last) < self.publish_interval)
        {
            return;
        }
        self.last_publish = Some(now);

        let mut running_mask = 0u16;
        for (index, unit) in units.iter().enumerate() {
            let status = unit.status(now);
            if status.state() == UnitState::Running {
                running_mask |= 1 << index;
            }

            let base = regmap::unit_base(index);
            self.bank
                .write(base + regmap::REG_UNIT_POWER_WATTS, status.power_watts());
            self.bank.write(
                base + regmap::REG_UNIT_FREQUENCY,
                status.frequency().hz().min(u16::MAX as u32) as u16,
            );
            self.bank
                .write(base + regmap::REG_UNIT_STATUS_FLAGS, status.flags().bits());
            self.bank.write(
                base + regmap::REG_UNIT_AMPLITUDE_ACTUAL,
                amplitude.percent() as u16,
            );
            self.bank
                .write(base + regmap::REG_UNIT_FAULT_MASK, status.faults().bits());
            self.bank.write(
                base + regmap::REG_UNIT_START_COUNT,
                status.start_count() as u16,
            );
            let runtime = status.run_time().as_secs();
            self.bank
                .write(base + regmap::REG_UNIT_RUNTIME_LO, runtime as u16);
            self.bank
                .write(base + regmap::REG_UNIT_RUNTIME_HI, (runtime >> 16) as u16);
        }

        self.bank.write(regmap::ADDR_UNIT_COUNT, units.len() as u16);
        self.bank.write(regmap::ADDR_RUNNING_MASK, running_mask);
        self.bank
            .write(regmap::ADDR_RUNNING_COUNT, running_mask.count_ones() as u16);
        self.bank
            .write(regmap::ADDR_AMPLITUDE_ACTUAL, amplitude.percent() as u16);

        tracing::trace!(running_mask, "telemetry published");
    }

    /// True when intake ran recently enough for register commands to take
    /// effect within the latency target.
    #[must_use]
    pub fn is_responsive(&self, now: Instant) -> bool {
        self.last_apply
            .is_some_and(|last| now.duration_since(last) <= params::COMMAND_LATENCY_TARGET)
    }

    /// Instant of the most recent intake.
    #[must_use]
    pub const fn last_apply(&self) -> Option<Instant> {
        self.last_apply
    }

    /// The wrapped register bank.
    #[must_use]
    pub const fn bank(&self) -> &R {
        &self.bank
    }

    /// The wrapped register bank, mutably. Meant for the transport side.
    pub fn bank_mut(&mut self) -> &mut R {
        &mut self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonicator_core::hal::{AdcChannel, GpioLine};
    use sonicator_sim::SimRegisters;

    fn bridge() -> RegisterBridge<SimRegisters> {
        RegisterBridge::new(SimRegisters::new())
    }

    fn unit(id: u8) -> SonicatorUnit {
        SonicatorUnit::new(
            crate::unit::ChannelConfig {
                id,
                start_line: GpioLine(0),
                reset_line: GpioLine(1),
                overload_line: GpioLine(2),
                lock_line: GpioLine(3),
                power_channel: AdcChannel(0),
                capture_channel: 0,
            },
            Instant::ZERO,
        )
    }

    #[test]
    fn emergency_stop_acts_exactly_once() {
        let mut b = bridge();
        let t = Instant::ZERO;

        b.bank_mut().master_write(regmap::ADDR_ESTOP, 1, t);
        assert!(b.intake_global(t).emergency_stop);
        assert_eq!(0, b.bank().read(regmap::ADDR_ESTOP));
        assert!(!b.intake_global(t).emergency_stop);
    }

    #[test]
    fn emergency_stop_clears_run_levels() {
        let mut b = bridge();
        let t = Instant::ZERO;

        b.bank_mut().master_write(regmap::ADDR_GLOBAL_ENABLE, 1, t);
        b.bank_mut()
            .master_write(regmap::unit_base(0) + regmap::REG_UNIT_START_STOP, 1, t);
        b.bank_mut()
            .master_write(regmap::unit_base(3) + regmap::REG_UNIT_START_STOP, 1, t);
        b.bank_mut().master_write(regmap::ADDR_ESTOP, 1, t);

        let global = b.intake_global(t);
        assert!(global.emergency_stop);
        assert!(!global.enable);
        assert!(!b.intake_unit(0, t).run);
        assert!(!b.intake_unit(3, t).run);
    }

    #[test]
    fn overload_reset_acts_exactly_once() {
        let mut b = bridge();
        let t = Instant::ZERO;
        let addr = regmap::unit_base(2) + regmap::REG_UNIT_OVERLOAD_RESET;

        b.bank_mut().master_write(addr, 1, t);
        assert!(b.intake_unit(2, t).reset_overload);
        assert_eq!(0, b.bank().read(addr));
        assert!(!b.intake_unit(2, t).reset_overload);
    }

    #[test]
    fn amplitude_changes_are_edges() {
        let mut b = bridge();
        let t = Instant::ZERO;

        // boot value is not a change
        assert!(!b.intake_global(t).amplitude_changed);

        b.bank_mut().master_write(regmap::ADDR_GLOBAL_AMPLITUDE, 50, t);
        let cmd = b.intake_global(t);
        assert!(cmd.amplitude_changed);
        assert_eq!(Amplitude::clamped(50), cmd.amplitude);

        // unchanged level is not a change
        assert!(!b.intake_global(t).amplitude_changed);
    }

    #[rstest::rstest]
    #[case::below_range(Amplitude::MIN, 5)]
    #[case::above_range(Amplitude::MAX, 300)]
    fn amplitude_is_clamped(#[case] expected: Amplitude, #[case] raw: u16) {
        let mut b = bridge();
        let t = Instant::ZERO;
        b.bank_mut()
            .master_write(regmap::unit_base(0) + regmap::REG_UNIT_AMPLITUDE, raw, t);
        assert_eq!(expected, b.intake_unit(0, t).amplitude);
    }

    #[test]
    fn publish_is_cadence_bounded() {
        let mut b = bridge();
        let one = [unit(1)];
        let two = [unit(1), unit(2)];

        let t0 = Instant::ZERO;
        b.publish(&one, Amplitude::default(), t0);
        assert_eq!(1, b.bank().read(regmap::ADDR_UNIT_COUNT));

        // inside the interval nothing is rewritten
        b.publish(&two, Amplitude::default(), t0 + Duration::from_millis(10));
        assert_eq!(1, b.bank().read(regmap::ADDR_UNIT_COUNT));

        b.publish(&two, Amplitude::default(), t0 + params::PUBLISH_INTERVAL);
        assert_eq!(2, b.bank().read(regmap::ADDR_UNIT_COUNT));
    }

    #[test]
    fn publish_writes_unit_telemetry() {
        let mut b = bridge();
        let units = [unit(1)];
        let amplitude = Amplitude::clamped(75);

        b.publish(&units, amplitude, Instant::ZERO);

        let base = regmap::unit_base(0);
        assert_eq!(
            75,
            b.bank().read(base + regmap::REG_UNIT_AMPLITUDE_ACTUAL)
        );
        assert_eq!(75, b.bank().read(regmap::ADDR_AMPLITUDE_ACTUAL));
        assert_eq!(0, b.bank().read(regmap::ADDR_RUNNING_MASK));
        assert_eq!(0, b.bank().read(base + regmap::REG_UNIT_FAULT_MASK));
    }

    #[test]
    fn responsiveness_tracks_intake() {
        let mut b = bridge();
        let t0 = Instant::ZERO;
        assert!(!b.is_responsive(t0));

        b.intake_global(t0);
        assert!(b.is_responsive(t0 + Duration::from_millis(50)));
        assert!(!b.is_responsive(t0 + Duration::from_millis(150)));
    }
}
