//! Control core for a multi-unit sonicator controller.
//!
//! The crate is tick driven: a single control task calls
//! [`Coordinator::tick`] at a fixed rate and everything else follows from
//! that call. The only state shared with interrupt context is the edge
//! count inside [`FrequencyCounter`].
//!
//! [`Coordinator::tick`]: coordinator::Coordinator::tick
//! [`FrequencyCounter`]: capture::FrequencyCounter

pub mod bridge;
pub mod capture;
pub mod coordinator;
pub mod params;
pub mod unit;
