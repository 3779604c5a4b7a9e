//! Length-prefixed frame reassembly for the card-reader status stream.
//!
//! The peripheral delivers raw bytes in arbitrarily sized chunks with no
//! alignment to message boundaries. Every status message is framed as:
//! - A 2-byte big-endian payload length (excluding the header itself)
//! - The payload bytes
//!
//! Frames are packed back-to-back with no other delimiter. This crate turns
//! the chunked stream back into whole payloads:
//! - [`FrameAssembler`] for push-driven reassembly (feed chunks, drain frames)
//! - [`FrameReader`]/[`FrameWriter`] for blocking capture files and pipes
//! - `StreamFrameCodec` (feature `async`) for `tokio_util::codec` framing
//!
//! No partial reads, no buffer management in user code.

pub mod assembler;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use assembler::FrameAssembler;
#[cfg(feature = "async")]
pub use codec::StreamFrameCodec;
pub use codec::{decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
