/// Number of 16-bit words in the register space.
pub const REGISTER_SPACE_WORDS: u16 = 0x0200;

/// Global output gate; units may drive output only while nonzero.
pub const ADDR_GLOBAL_ENABLE: u16 = 0x0000;
/// Shared amplitude setpoint in percent.
pub const ADDR_GLOBAL_AMPLITUDE: u16 = 0x0001;
/// Write 1 to stop every unit immediately; consumed and cleared.
pub const ADDR_ESTOP: u16 = 0x0002;
/// Number of configured units.
pub const ADDR_UNIT_COUNT: u16 = 0x0003;

/// Bitmask of units currently running.
pub const ADDR_RUNNING_MASK: u16 = 0x0010;
/// Count of units currently running.
pub const ADDR_RUNNING_COUNT: u16 = 0x0011;
/// Amplitude actually driven on the shared line, in percent.
pub const ADDR_AMPLITUDE_ACTUAL: u16 = 0x0012;

/// Base address of the first per-unit block.
pub const UNIT_BLOCK_BASE: u16 = 0x0100;
/// Distance between consecutive per-unit blocks.
pub const UNIT_BLOCK_STRIDE: u16 = 0x0020;

/// Start/stop control level; 1 requests running.
pub const REG_UNIT_START_STOP: u16 = 0x00;
/// Per-unit amplitude setpoint in percent; raw values are accepted and clamped on use.
pub const REG_UNIT_AMPLITUDE: u16 = 0x01;
/// Write 1 to request an overload reset; consumed and cleared.
pub const REG_UNIT_OVERLOAD_RESET: u16 = 0x02;

/// Measured output power in watts.
pub const REG_UNIT_POWER_WATTS: u16 = 0x10;
/// Measured operating frequency in Hz.
pub const REG_UNIT_FREQUENCY: u16 = 0x11;
/// Bit-mapped unit status, see [`StatusFlags`](super::StatusFlags).
pub const REG_UNIT_STATUS_FLAGS: u16 = 0x12;
/// Amplitude applied to this unit, in percent.
pub const REG_UNIT_AMPLITUDE_ACTUAL: u16 = 0x13;
/// Active fault conditions, see [`FaultMask`](crate::fault::FaultMask).
pub const REG_UNIT_FAULT_MASK: u16 = 0x14;
/// Lifetime start counter; wraps at 16 bits.
pub const REG_UNIT_START_COUNT: u16 = 0x15;
/// Cumulative run time in seconds, low word.
pub const REG_UNIT_RUNTIME_LO: u16 = 0x16;
/// Cumulative run time in seconds, high word.
pub const REG_UNIT_RUNTIME_HI: u16 = 0x17;

/// Returns the base address of the register block of unit `index`.
#[must_use]
pub const fn unit_base(index: usize) -> u16 {
    UNIT_BLOCK_BASE + index as u16 * UNIT_BLOCK_STRIDE
}
