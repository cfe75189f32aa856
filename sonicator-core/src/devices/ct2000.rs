use core::ops::RangeInclusive;

use crate::common::Freq;

/// A CT2000-class ultrasonic sonicator unit.
#[derive(Clone, Copy, Debug)]
pub struct Ct2000;

impl Ct2000 {
    /// Nominal operating frequency.
    pub const NOMINAL_FREQ: Freq<u32> = Freq { freq: 20_000 };

    /// Band within which a measurement corroborates the hardware lock signal.
    pub const LOCK_BAND: RangeInclusive<Freq<u32>> =
        Freq { freq: 19_500 }..=Freq { freq: 20_500 };

    /// Band of physically plausible measurements; values outside are
    /// measurement artifacts, not real operating points.
    pub const PLAUSIBLE_BAND: RangeInclusive<Freq<u32>> =
        Freq { freq: 15_000 }..=Freq { freq: 25_000 };

    /// The unit divides its internal frequency by this factor before
    /// presenting it on the monitor output.
    pub const FREQ_DIVIDER: u32 = 10;

    /// Rated maximum output power.
    pub const MAX_POWER_WATTS: u16 = 2_000;
}
