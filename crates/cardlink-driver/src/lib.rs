//! Mock card-reader hardware driver.
//!
//! Fabricates the timed read/eject behavior of the physical device so the
//! rest of the stack can run without hardware. The driver is an independent
//! collaborator: it produces timed states under a cancellation token and
//! knows nothing about the status byte stream.

pub mod driver;

pub use driver::{CardData, EjectOutcome, MockCardReader};
