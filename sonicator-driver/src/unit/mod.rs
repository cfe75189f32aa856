mod command;
mod faults;
mod status;

pub use command::UnitCommand;
pub use status::UnitStatus;

use command::RequestFlags;
use faults::{FaultInputs, FaultMonitor};

use core::time::Duration;

use sonicator_core::{
    common::{Amplitude, Freq, Hz, Instant},
    devices::Ct2000,
    error::CommandError,
    fault::FaultMask,
    hal::{Adc, AdcChannel, Gpio, GpioLine},
    state::UnitState,
};

use crate::{capture::FrequencyCounter, params};

/// Static wiring of one sonicator channel. Fixed at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Channel identity, 1 through [`params::MAX_UNITS`].
    pub id: u8,
    /// Output asserting the unit's start input.
    pub start_line: GpioLine,
    /// Output pulsing the unit's overload reset input.
    pub reset_line: GpioLine,
    /// Input carrying the unit's overload indication.
    pub overload_line: GpioLine,
    /// Input carrying the unit's frequency lock indication.
    pub lock_line: GpioLine,
    /// ADC channel sampling the unit's power monitor output.
    pub power_channel: AdcChannel,
    /// Capture channel counting the unit's frequency monitor edges.
    pub capture_channel: usize,
}

/// One sonicator channel: state machine, fault bookkeeping, and telemetry.
///
/// The unit drives its own start and reset lines. The amplitude line is
/// shared between all units and belongs to the coordinator.
pub struct SonicatorUnit {
    config: ChannelConfig,
    state: UnitState,
    previous_state: UnitState,
    state_entered_at: Instant,
    amplitude: Amplitude,
    requests: RequestFlags,
    faults: FaultMonitor,
    reset_pulse_until: Option<Instant>,

    frequency: Freq<u32>,
    power_raw: u16,
    locked: bool,

    fault_count: u32,
    last_fault: FaultMask,
    last_fault_at: Option<Instant>,
    start_count: u32,
    run_time: Duration,
    run_started_at: Option<Instant>,
    last_start_at: Option<Instant>,
    last_update_at: Option<Instant>,
    last_external_write: Option<Instant>,
    watchdog_serviced_at: Instant,
}

impl SonicatorUnit {
    /// Creates an idle unit wired according to `config`.
    #[must_use]
    pub fn new(config: ChannelConfig, now: Instant) -> Self {
        Self {
            config,
            state: UnitState::Idle,
            previous_state: UnitState::Idle,
            state_entered_at: now,
            amplitude: Amplitude::default(),
            requests: RequestFlags::default(),
            faults: FaultMonitor::default(),
            reset_pulse_until: None,
            frequency: 0 * Hz,
            power_raw: 0,
            locked: false,
            fault_count: 0,
            last_fault: FaultMask::NONE,
            last_fault_at: None,
            start_count: 0,
            run_time: Duration::ZERO,
            run_started_at: None,
            last_start_at: None,
            last_update_at: None,
            last_external_write: None,
            watchdog_serviced_at: now,
        }
    }

    /// The unit's wiring.
    #[must_use]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Current operating state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Active fault conditions.
    #[must_use]
    pub fn faults(&self) -> FaultMask {
        self.faults.mask()
    }

    /// Instant at which `condition` became active, if it is.
    #[must_use]
    pub fn fault_active_since(&self, condition: FaultMask) -> Option<Instant> {
        self.faults.active_since(condition)
    }

    /// Requests a start, consumed by the next [`update`](Self::update).
    ///
    /// Accepted only while idle with no active fault.
    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.state != UnitState::Idle || !self.faults.mask().is_empty() {
            return Err(CommandError::StartRejected(self.state, self.faults.mask()));
        }
        self.requests.start = true;
        Ok(())
    }

    /// Requests a stop, consumed by the next [`update`](Self::update).
    ///
    /// Accepted while starting or running.
    pub fn stop(&mut self) -> Result<(), CommandError> {
        if !matches!(self.state, UnitState::Starting | UnitState::Running) {
            return Err(CommandError::StopRejected(self.state));
        }
        self.requests.stop = true;
        Ok(())
    }

    /// Stores the clamped amplitude setpoint and returns it.
    ///
    /// Always succeeds. The stored value is informational while the shared
    /// amplitude line is driven by the coordinator.
    pub fn set_amplitude(&mut self, percent: u8) -> Amplitude {
        self.amplitude = Amplitude::clamped(percent);
        self.amplitude
    }

    /// Clears a latched overload and, when no other condition remains,
    /// returns the unit to idle immediately.
    ///
    /// A fixed-width pulse on the reset line is issued from the next tick so
    /// the latch inside the unit clears as well. Accepted only in the fault
    /// state.
    pub fn reset_overload(&mut self, now: Instant) -> Result<(), CommandError> {
        if self.state != UnitState::Fault {
            return Err(CommandError::ResetRejected(self.state));
        }
        self.faults.reset_overload();
        self.reset_pulse_until = Some(now + params::RESET_PULSE_WIDTH);
        if self.faults.mask().is_empty() {
            tracing::debug!(unit = self.config.id, "overload cleared");
            self.enter(UnitState::Idle, now);
        }
        Ok(())
    }

    /// Stops the output and returns to idle, all synchronously.
    ///
    /// Pending requests and every fault condition are dropped, keeping the
    /// idle state and an empty mask consistent at the instant of the stop.
    /// An overload still physically present re-latches after a fresh
    /// debounce interval.
    pub fn emergency_stop<G: Gpio>(&mut self, gpio: &mut G, now: Instant) {
        tracing::warn!(unit = self.config.id, state = %self.state, "emergency stop");
        self.requests.clear();
        self.reset_pulse_until = None;
        self.faults.clear();
        self.end_run(now);
        gpio.set_level(self.config.start_line, false);
        gpio.set_level(self.config.reset_line, false);
        self.enter(UnitState::Idle, now);
    }

    /// True when no fault condition is active, the watchdog was serviced in
    /// time, and external commands are fresh.
    #[must_use]
    pub fn is_safe(&self, now: Instant) -> bool {
        self.faults.mask().is_empty()
            && now.duration_since(self.watchdog_serviced_at) <= params::WATCHDOG_TIMEOUT
            && self.comm_fresh(now)
    }

    /// Advances the unit by one tick and returns the resulting state.
    ///
    /// The order within a tick is fixed: command intake, input sampling,
    /// lock corroboration, fault evaluation, state advancement, output
    /// drive, watchdog service last. Fault evaluation therefore always sees
    /// the freshest commands, and a start arriving together with a fault
    /// input can never slip through to running.
    pub fn update<B: Gpio + Adc>(
        &mut self,
        board: &mut B,
        counter: &mut FrequencyCounter,
        command: Option<UnitCommand>,
        now: Instant,
    ) -> UnitState {
        if let Some(command) = command {
            self.apply_command(command, now);
        }
        self.last_update_at = Some(now);

        let overload_raw = board.level(self.config.overload_line);
        let lock_raw = board.level(self.config.lock_line);
        self.power_raw = board.sample(self.config.power_channel);
        self.frequency = match counter.sample(self.config.capture_channel, now) {
            Ok(frequency) => frequency,
            Err(e) => {
                tracing::warn!(unit = self.config.id, "frequency sample failed: {}", e);
                0 * Hz
            }
        };

        // An in-band measurement corroborates the lock line, a zero
        // measurement falls back to it, anything else overrides it.
        self.locked = if self.frequency.hz() == 0 {
            lock_raw
        } else {
            Ct2000::LOCK_BAND.contains(&self.frequency)
        };

        let mask = self.faults.evaluate(
            FaultInputs {
                overload_raw,
                lock_ok: self.locked,
                running: self.state == UnitState::Running,
                last_external_write: self.last_external_write,
                watchdog_serviced_at: self.watchdog_serviced_at,
            },
            now,
        );
        if !mask.is_empty() && self.state != UnitState::Fault {
            tracing::warn!(unit = self.config.id, faults = %mask, "fault raised");
            self.fault_count += 1;
            self.last_fault = mask;
            self.last_fault_at = Some(now);
            self.requests.clear();
            self.end_run(now);
            self.enter(UnitState::Fault, now);
        } else if mask.is_empty() && self.state == UnitState::Fault {
            tracing::debug!(unit = self.config.id, "fault conditions cleared");
            self.enter(UnitState::Idle, now);
        }

        let requests = self.requests.take();
        match self.state {
            UnitState::Idle => {
                if requests.start && mask.is_empty() {
                    self.enter(UnitState::Starting, now);
                }
            }
            UnitState::Starting => {
                if requests.stop {
                    self.enter(UnitState::Stopping, now);
                } else if now.duration_since(self.state_entered_at) >= params::START_DELAY {
                    self.start_count += 1;
                    self.last_start_at = Some(now);
                    self.run_started_at = Some(now);
                    self.enter(UnitState::Running, now);
                }
            }
            UnitState::Running => {
                if requests.stop {
                    self.end_run(now);
                    self.enter(UnitState::Stopping, now);
                }
            }
            UnitState::Stopping => {
                if now.duration_since(self.state_entered_at) >= params::STOP_DELAY {
                    self.enter(UnitState::Idle, now);
                }
            }
            UnitState::Fault => {}
        }

        board.set_level(self.config.start_line, self.state.is_powered());
        if let Some(until) = self.reset_pulse_until {
            let asserted = now < until;
            board.set_level(self.config.reset_line, asserted);
            if !asserted {
                self.reset_pulse_until = None;
            }
        }

        // service last, so a late tick is visible to the next evaluation
        self.watchdog_serviced_at = now;

        self.state
    }

    /// Returns a copy snapshot of the externally visible state.
    #[must_use]
    pub fn status(&self, now: Instant) -> UnitStatus {
        UnitStatus {
            id: self.config.id,
            state: self.state,
            previous_state: self.previous_state,
            amplitude: self.amplitude,
            frequency: self.frequency,
            power_raw: self.power_raw,
            locked: self.locked,
            faults: self.faults.mask(),
            fault_count: self.fault_count,
            last_fault: self.last_fault,
            last_fault_at: self.last_fault_at,
            start_count: self.start_count,
            run_time: self.run_time
                + self
                    .run_started_at
                    .map_or(Duration::ZERO, |started| now.duration_since(started)),
            last_start_at: self.last_start_at,
            last_update_at: self.last_update_at,
        }
    }

    fn apply_command(&mut self, command: UnitCommand, now: Instant) {
        self.last_external_write = command.last_external_write;
        self.amplitude = command.amplitude;
        if command.reset_overload {
            if let Err(e) = self.reset_overload(now) {
                tracing::debug!(unit = self.config.id, "register reset ignored: {}", e);
            }
        }
        match (command.run, self.state) {
            (true, UnitState::Idle) => {
                if let Err(e) = self.start() {
                    tracing::trace!(unit = self.config.id, "register start ignored: {}", e);
                }
            }
            (false, UnitState::Starting | UnitState::Running) => {
                if let Err(e) = self.stop() {
                    tracing::trace!(unit = self.config.id, "register stop ignored: {}", e);
                }
            }
            _ => {}
        }
    }

    fn enter(&mut self, state: UnitState, now: Instant) {
        tracing::debug!(unit = self.config.id, from = %self.state, to = %state, "transition");
        self.previous_state = self.state;
        self.state = state;
        self.state_entered_at = now;
    }

    fn end_run(&mut self, now: Instant) {
        if let Some(started) = self.run_started_at.take() {
            self.run_time += now.duration_since(started);
        }
    }

    fn comm_fresh(&self, now: Instant) -> bool {
        match self.last_external_write {
            Some(written) => now.duration_since(written) <= params::COMM_TIMEOUT,
            None => true,
        }
    }
}
