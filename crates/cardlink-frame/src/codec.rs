use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: big-endian payload length (2 bytes).
pub const HEADER_SIZE: usize = 2;

/// Default maximum payload size: everything a 2-byte length can declare.
pub const DEFAULT_MAX_PAYLOAD: usize = u16::MAX as usize;

/// Encode one payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬──────────────────┐
/// │ Length (2B BE) │ Payload (Length) │
/// └────────────────┴──────────────────┘
/// ```
///
/// Frames are packed back-to-back with no delimiter other than the length
/// field itself.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u16::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u16(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet;
/// nothing is consumed in that case. On success, consumes exactly
/// header + payload bytes from the head and returns the payload.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let payload_len = u16::from_be_bytes([src[0], src[1]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Describes a partial frame at the head of `src`, if any.
///
/// Returns `(needed, buffered)` — the total byte count the head frame
/// requires versus what has arrived so far — or `None` when the buffer is
/// empty or already holds a complete frame.
pub fn pending_frame(src: &[u8]) -> Option<(usize, usize)> {
    if src.is_empty() {
        return None;
    }
    let needed = if src.len() < HEADER_SIZE {
        HEADER_SIZE
    } else {
        HEADER_SIZE + u16::from_be_bytes([src[0], src[1]]) as usize
    };
    (src.len() < needed).then_some((needed, src.len()))
}

/// Configuration for frame extraction.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum accepted payload size in bytes. Default: `u16::MAX`.
    pub max_payload_size: usize,
    /// How long a partial frame may wait for further bytes before the
    /// stream is reported as stalled. `None` disables the check.
    pub read_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
        }
    }
}

/// `tokio_util` codec adapter, so a raw `AsyncRead` byte source can be
/// consumed as frames with `FramedRead` (and produced with `FramedWrite`).
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct StreamFrameCodec {
    max_payload_size: usize,
}

#[cfg(feature = "async")]
impl StreamFrameCodec {
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }
}

#[cfg(feature = "async")]
impl Default for StreamFrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Decoder for StreamFrameCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        decode_frame(src, self.max_payload_size)
    }
}

#[cfg(feature = "async")]
impl tokio_util::codec::Encoder<Bytes> for StreamFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        encode_frame(&item, dst)
    }
}
