use sonicator_core::{
    common::{Amplitude, Instant},
    error::ConfigError,
    hal::{Board, GpioLine, PwmChannel},
    registers::RegisterBank,
    state::UnitState,
};

use crate::{
    bridge::RegisterBridge,
    capture::FrequencyCounter,
    params,
    unit::{ChannelConfig, SonicatorUnit, UnitStatus},
};

/// Owner of the board and every unit on it.
///
/// One call to [`tick`](Self::tick) per control period drives the whole
/// system: register intake, every unit in index order, the shared outputs,
/// and telemetry publication. Units never touch the shared amplitude line or
/// the running indicator; those belong here.
pub struct Coordinator<B: Board> {
    board: B,
    counter: FrequencyCounter,
    units: Vec<SonicatorUnit>,
    amplitude: Amplitude,
    enabled: bool,
    amplitude_channel: PwmChannel,
    indicator_line: GpioLine,
    any_running: bool,
}

impl<B: Board> Coordinator<B> {
    /// Wires up `configs.len()` units and one capture channel per unit.
    ///
    /// The shared outputs start disabled and low.
    pub fn new(
        board: B,
        configs: &[ChannelConfig],
        amplitude_channel: PwmChannel,
        indicator_line: GpioLine,
    ) -> Result<Self, ConfigError> {
        if configs.is_empty() || configs.len() > params::MAX_UNITS {
            return Err(ConfigError::TooManyUnits(configs.len(), params::MAX_UNITS));
        }
        if let Some(config) = configs
            .iter()
            .find(|config| config.capture_channel >= configs.len())
        {
            return Err(ConfigError::CaptureChannelOutOfRange(
                config.capture_channel,
                configs.len(),
            ));
        }

        let now = board.now();
        let counter = FrequencyCounter::new(configs.len(), now);
        let units = configs
            .iter()
            .map(|&config| SonicatorUnit::new(config, now))
            .collect();

        let mut coordinator = Self {
            board,
            counter,
            units,
            amplitude: Amplitude::default(),
            enabled: false,
            amplitude_channel,
            indicator_line,
            any_running: false,
        };
        coordinator.drive_shared_outputs();
        Ok(coordinator)
    }

    /// Runs one control period.
    ///
    /// Register intake comes first so every unit sees this period's
    /// commands, units advance in index order, and publication happens last
    /// so the registers reflect the states the period ended in.
    #[tracing::instrument(skip(self, bridge))]
    pub fn tick<R: RegisterBank>(&mut self, bridge: &mut RegisterBridge<R>) {
        let now = self.board.now();

        let global = bridge.intake_global(now);
        if global.emergency_stop {
            self.emergency_stop_all(now);
        }
        self.enabled = global.enable;
        if global.amplitude_changed {
            self.amplitude = global.amplitude;
        }

        for (index, unit) in self.units.iter_mut().enumerate() {
            let command = bridge.intake_unit(index, now);
            if command.amplitude_changed {
                self.amplitude = command.amplitude;
            }
            unit.update(&mut self.board, &mut self.counter, Some(command), now);
        }

        self.any_running = self
            .units
            .iter()
            .any(|unit| unit.state() == UnitState::Running);
        self.drive_shared_outputs();

        bridge.publish(&self.units, self.amplitude, now);
    }

    /// Sets the shared amplitude. The most recent writer wins, whether it is
    /// this call or a register write picked up by the next tick.
    pub fn set_amplitude(&mut self, percent: u8) -> Amplitude {
        self.amplitude = Amplitude::clamped(percent);
        self.drive_shared_outputs();
        self.amplitude
    }

    /// Gates the shared amplitude output. While disabled the line idles at
    /// zero duty regardless of the setpoint.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.drive_shared_outputs();
    }

    /// Stops every unit and the shared outputs, synchronously.
    #[tracing::instrument(skip(self))]
    pub fn emergency_stop_all(&mut self, now: Instant) {
        tracing::warn!("emergency stop, all units");
        for unit in self.units.iter_mut() {
            unit.emergency_stop(&mut self.board, now);
        }
        self.enabled = false;
        self.any_running = false;
        self.drive_shared_outputs();
    }

    /// Snapshot of unit `index`, or [`None`] for an index out of range.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<UnitStatus> {
        let now = self.board.now();
        self.units.get(index).map(|unit| unit.status(now))
    }

    /// True when every unit is safe.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        let now = self.board.now();
        self.units.iter().all(|unit| unit.is_safe(now))
    }

    /// Shared amplitude setpoint.
    #[must_use]
    pub const fn amplitude(&self) -> Amplitude {
        self.amplitude
    }

    /// Shared amplitude gate.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// True when any unit was running at the end of the last tick.
    #[must_use]
    pub const fn any_running(&self) -> bool {
        self.any_running
    }

    /// The units, in index order.
    #[must_use]
    pub fn units(&self) -> &[SonicatorUnit] {
        &self.units
    }

    /// A unit by index.
    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&SonicatorUnit> {
        self.units.get(index)
    }

    /// A unit by index, mutably.
    pub fn unit_mut(&mut self, index: usize) -> Option<&mut SonicatorUnit> {
        self.units.get_mut(index)
    }

    /// The capture channels. Interrupt handlers share this through
    /// [`FrequencyCounter::record_edge`].
    #[must_use]
    pub const fn frequency_counter(&self) -> &FrequencyCounter {
        &self.counter
    }

    /// The capture channels, mutably, for tuning and statistics.
    pub fn frequency_counter_mut(&mut self) -> &mut FrequencyCounter {
        &mut self.counter
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &B {
        &self.board
    }

    /// The board, mutably.
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    fn drive_shared_outputs(&mut self) {
        let duty = if self.enabled { self.amplitude.duty() } else { 0 };
        self.board.set_duty(self.amplitude_channel, duty);
        self.board.set_level(self.indicator_line, self.any_running);
    }
}
