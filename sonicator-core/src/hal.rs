use derive_more::Display;

use crate::common::Instant;

/// Identifier of a discrete input or output line.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("GPIO{}", _0)]
#[repr(C)]
pub struct GpioLine(pub u8);

/// Identifier of an analog input channel.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("ADC{}", _0)]
#[repr(C)]
pub struct AdcChannel(pub u8);

/// Identifier of a PWM output channel.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
#[display("PWM{}", _0)]
#[repr(C)]
pub struct PwmChannel(pub u8);

/// Discrete input/output port.
pub trait Gpio {
    /// Returns the current level of `line`.
    fn level(&self, line: GpioLine) -> bool;
    /// Drives `line` high or low.
    fn set_level(&mut self, line: GpioLine, high: bool);
}

/// Analog input port.
pub trait Adc {
    /// Samples `channel`, returning the raw conversion result.
    fn sample(&mut self, channel: AdcChannel) -> u16;
}

/// PWM output port.
pub trait Pwm {
    /// Sets the 8-bit duty cycle of `channel`.
    fn set_duty(&mut self, channel: PwmChannel, duty: u8);
}

/// Monotonic time source.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Everything the control core needs from the hardware, as one bound.
pub trait Board: Gpio + Adc + Pwm + Clock {}

impl<T: Gpio + Adc + Pwm + Clock> Board for T {}
