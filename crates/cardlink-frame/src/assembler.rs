use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{decode_frame, pending_frame, DEFAULT_MAX_PAYLOAD};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Reassembles length-prefixed frames from arbitrarily chunked input.
///
/// Owns a single growable buffer: chunks append at the tail, complete
/// frames leave from the head. At all times the buffer holds zero or more
/// complete-but-unextracted frames followed by at most one partial frame.
///
/// Callers drain with [`try_next`](Self::try_next) until it returns
/// `Ok(None)`, so a chunk that completes several frames at once yields all
/// of them before more input is needed.
pub struct FrameAssembler {
    buf: BytesMut,
    max_payload_size: usize,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_PAYLOAD)
    }

    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_payload_size,
        }
    }

    /// Append a newly arrived chunk at the tail of the buffer.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Try to extract the next complete frame from the head of the buffer.
    ///
    /// Returns `Ok(None)` when the buffered bytes don't yet complete a
    /// frame; nothing is consumed in that case. On success, exactly
    /// header + payload bytes leave the head and the payload is returned —
    /// bytes belonging to the next frame stay untouched.
    pub fn try_next(&mut self) -> Result<Option<Bytes>> {
        let payload = decode_frame(&mut self.buf, self.max_payload_size)?;
        if let Some(payload) = &payload {
            trace!(
                payload_len = payload.len(),
                buffered = self.buf.len(),
                "frame extracted"
            );
        }
        Ok(payload)
    }

    /// Bytes currently buffered, complete and partial frames together.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Describes the partial frame at the head of the buffer, if any, as
    /// `(needed, buffered)` totals.
    pub fn pending_frame(&self) -> Option<(usize, usize)> {
        pending_frame(&self.buf)
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame;
    use crate::error::FrameError;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn drain(assembler: &mut FrameAssembler) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = assembler.try_next().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn single_frame_single_chunk() {
        let mut assembler = FrameAssembler::new();
        assembler.push(&wire(&[b"hello"]));

        let frames = drain(&mut assembler);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), b"hello");
        assert_eq!(assembler.buffered(), 0);
    }

    #[test]
    fn frame_split_across_chunks() {
        let bytes = wire(&[b"split me"]);
        let mut assembler = FrameAssembler::new();

        assembler.push(&bytes[..3]);
        assert!(assembler.try_next().unwrap().is_none());

        assembler.push(&bytes[3..]);
        let frame = assembler.try_next().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"split me");
    }

    #[test]
    fn byte_at_a_time() {
        let bytes = wire(&[b"one", b"two"]);
        let mut assembler = FrameAssembler::new();
        let mut frames = Vec::new();

        for byte in &bytes {
            assembler.push(std::slice::from_ref(byte));
            frames.extend(drain(&mut assembler));
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), b"one");
        assert_eq!(frames[1].as_ref(), b"two");
    }

    // Pins the drain-all behavior: one arrival completing several frames
    // yields every one of them without waiting for another chunk.
    #[test]
    fn chunk_completing_three_frames_yields_all_three() {
        let mut assembler = FrameAssembler::new();
        assembler.push(&wire(&[b"a", b"bb", b"ccc"]));

        let frames = drain(&mut assembler);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].as_ref(), b"a");
        assert_eq!(frames[1].as_ref(), b"bb");
        assert_eq!(frames[2].as_ref(), b"ccc");
    }

    #[test]
    fn trailing_partial_frame_stays_buffered() {
        let mut bytes = wire(&[b"whole"]);
        let second = wire(&[b"partial"]);
        bytes.extend_from_slice(&second[..4]);

        let mut assembler = FrameAssembler::new();
        assembler.push(&bytes);

        let frames = drain(&mut assembler);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), b"whole");
        assert_eq!(assembler.buffered(), 4);
        assert_eq!(assembler.pending_frame(), Some((second.len(), 4)));

        assembler.push(&second[4..]);
        let frame = assembler.try_next().unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"partial");
        assert_eq!(assembler.pending_frame(), None);
    }

    #[test]
    fn declared_length_over_max_is_an_error() {
        let mut assembler = FrameAssembler::with_max_payload(16);
        assembler.push(&[0x00, 0x20]);

        let err = assembler.try_next().unwrap_err();
        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 32, max: 16 }
        ));
    }

    #[test]
    fn chunk_boundaries_do_not_change_output() {
        let bytes = wire(&[b"first", b"", b"third frame", b"4"]);

        for split in 1..bytes.len() {
            let mut assembler = FrameAssembler::new();
            let mut frames = Vec::new();

            assembler.push(&bytes[..split]);
            frames.extend(drain(&mut assembler));
            assembler.push(&bytes[split..]);
            frames.extend(drain(&mut assembler));

            let payloads: Vec<&[u8]> = frames.iter().map(|f| f.as_ref()).collect();
            assert_eq!(
                payloads,
                vec![b"first".as_ref(), b"".as_ref(), b"third frame".as_ref(), b"4".as_ref()],
                "split at byte {split}"
            );
        }
    }
}
