//! In-memory stand-ins for the controller hardware.
//!
//! [`SimBoard`] plays the board: inputs and the clock are scripted by the
//! test, outputs are recorded for inspection. [`SimRegisters`] plays the
//! register bank with the transport side scripted through
//! [`SimRegisters::master_write`].

use core::time::Duration;
use std::collections::HashMap;

use sonicator_core::{
    common::Instant,
    hal::{Adc, AdcChannel, Clock, Gpio, GpioLine, Pwm, PwmChannel},
    registers::{params::REGISTER_SPACE_WORDS, RegisterBank},
};

/// Scriptable board. Reads come from test-provided values, writes are kept
/// for assertions, and time only moves when the test moves it.
#[derive(Clone, Debug, Default)]
pub struct SimBoard {
    now: Instant,
    inputs: HashMap<GpioLine, bool>,
    outputs: HashMap<GpioLine, bool>,
    adc: HashMap<AdcChannel, u16>,
    duty: HashMap<PwmChannel, u8>,
}

impl SimBoard {
    /// A board at boot: time zero, all inputs low, all conversions zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The scripted clock.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now + by;
    }

    /// Sets the clock.
    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    /// Scripts the level of an input line.
    pub fn set_input(&mut self, line: GpioLine, high: bool) {
        self.inputs.insert(line, high);
    }

    /// Scripts the conversion result of an ADC channel.
    pub fn set_adc(&mut self, channel: AdcChannel, raw: u16) {
        self.adc.insert(channel, raw);
    }

    /// The last level driven on an output line, low if never driven.
    #[must_use]
    pub fn output(&self, line: GpioLine) -> bool {
        self.outputs.get(&line).copied().unwrap_or(false)
    }

    /// The last duty cycle driven on a PWM channel, zero if never driven.
    #[must_use]
    pub fn duty(&self, channel: PwmChannel) -> u8 {
        self.duty.get(&channel).copied().unwrap_or(0)
    }
}

impl Gpio for SimBoard {
    fn level(&self, line: GpioLine) -> bool {
        self.inputs.get(&line).copied().unwrap_or(false)
    }

    fn set_level(&mut self, line: GpioLine, high: bool) {
        self.outputs.insert(line, high);
    }
}

impl Adc for SimBoard {
    fn sample(&mut self, channel: AdcChannel) -> u16 {
        self.adc.get(&channel).copied().unwrap_or(0)
    }
}

impl Pwm for SimBoard {
    fn set_duty(&mut self, channel: PwmChannel, duty: u8) {
        self.duty.insert(channel, duty);
    }
}

impl Clock for SimBoard {
    fn now(&self) -> Instant {
        self.now
    }
}

/// Zero-initialized register bank with a scriptable transport side.
///
/// Writes through [`RegisterBank::write`] model the control core refreshing
/// telemetry and do not count as external; only
/// [`master_write`](Self::master_write) stamps the external write instant.
#[derive(Clone, Debug)]
pub struct SimRegisters {
    words: Vec<u16>,
    last_external_write: Option<Instant>,
}

impl SimRegisters {
    /// A register bank at boot: all words zero, no external write seen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            words: vec![0; REGISTER_SPACE_WORDS as usize],
            last_external_write: None,
        }
    }

    /// A validated write arriving from the external master at `now`.
    pub fn master_write(&mut self, addr: u16, value: u16, now: Instant) {
        self.words[addr as usize] = value;
        self.last_external_write = Some(now);
    }
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBank for SimRegisters {
    fn read(&self, addr: u16) -> u16 {
        self.words[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u16) {
        self.words[addr as usize] = value;
    }

    fn last_external_write(&self) -> Option<Instant> {
        self.last_external_write
    }
}
