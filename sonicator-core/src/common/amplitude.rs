/// Drive amplitude as a percentage of full output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct Amplitude(u8);

impl core::fmt::Debug for Amplitude {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl core::fmt::Display for Amplitude {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Amplitude {
    /// Minimum amplitude the hardware accepts.
    pub const MIN: Amplitude = Amplitude(20);
    /// Maximum amplitude.
    pub const MAX: Amplitude = Amplitude(100);

    /// Creates an amplitude from a percentage, saturating into the supported range.
    #[must_use]
    pub const fn clamped(percent: u8) -> Self {
        if percent < Self::MIN.0 {
            Self::MIN
        } else if percent > Self::MAX.0 {
            Self::MAX
        } else {
            Self(percent)
        }
    }

    /// Returns the amplitude in percent.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Maps the amplitude to an 8-bit PWM compare value.
    #[must_use]
    pub const fn duty(&self) -> u8 {
        (self.0 as u16 * u8::MAX as u16 / 100) as u8
    }
}

impl Default for Amplitude {
    fn default() -> Self {
        Self::MIN
    }
}
