/// Word addresses of the register map.
pub mod params;

mod status;

pub use status::StatusFlags;

use crate::common::Instant;

/// Word-addressed register file shared with the communication transport.
///
/// Framing, checksums, and bus addressing are the transport's concern;
/// values reaching this port are already validated. Addresses are word
/// addresses within [`params::REGISTER_SPACE_WORDS`].
pub trait RegisterBank {
    /// Returns the word at `addr`.
    fn read(&self, addr: u16) -> u16;
    /// Writes the word at `addr`.
    fn write(&mut self, addr: u16, value: u16);
    /// Instant of the most recent validated write by the external master,
    /// or `None` if the master has not written yet.
    fn last_external_write(&self) -> Option<Instant>;
}
