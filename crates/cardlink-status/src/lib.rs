//! Typed status messages for the card-reader stream.
//!
//! Frame payloads are ASCII text carrying one solicited status message
//! each: fields separated by [`FIELD_SEPARATOR`], fitness sub-entries by
//! [`GROUP_SEPARATOR`]. Three shapes are recognized — card-reader state,
//! transaction send status, and terminal fitness data; everything else is
//! dropped silently, which is the protocol's normal flow control for
//! message classes outside this decoder's scope.
//!
//! [`StatusSession`] ties the grammar to `cardlink-frame`'s reassembly:
//! feed it a channel of raw byte chunks and pull decoded messages in
//! arrival order.

pub mod decode;
pub mod fitness;
pub mod message;
pub mod session;

/// Top-level field separator (ASCII FS).
pub const FIELD_SEPARATOR: u8 = 0x1c;

/// Fitness-entry group separator (ASCII GS).
pub const GROUP_SEPARATOR: u8 = 0x1d;

pub use decode::decode_status;
pub use fitness::decode_fitness;
pub use message::{CardReaderState, FitnessEntry, GetFitnessData, SendStatus, StatusMessage};
pub use session::StatusSession;
