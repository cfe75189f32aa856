use core::time::Duration;

/// A monotonic timestamp with microsecond resolution.
///
/// The origin is the boot of the controller. It is expressed as a 64-bit
/// unsigned integer and can represent about 584,000 years of uptime, so
/// wrap-around is not a concern. All timing in the control core is
/// "elapsed since a recorded [`Instant`] compared against a threshold";
/// nothing sleeps on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct Instant {
    micros: u64,
}

impl Instant {
    /// The boot instant.
    pub const ZERO: Self = Self { micros: 0 };

    /// Creates an instant from microseconds since boot.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    /// Returns the microseconds since boot.
    #[must_use]
    pub const fn as_micros(&self) -> u64 {
        self.micros
    }

    /// Returns the time elapsed since `earlier`, or zero if `earlier` is in the future.
    #[must_use]
    pub const fn duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_micros(self.micros.saturating_sub(earlier.micros))
    }
}

impl core::ops::Add<Duration> for Instant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            micros: self.micros + rhs.as_micros() as u64,
        }
    }
}

impl core::ops::Sub<Duration> for Instant {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            micros: self.micros - rhs.as_micros() as u64,
        }
    }
}

impl core::ops::Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.duration_since(rhs)
    }
}
