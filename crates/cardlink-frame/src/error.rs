/// Errors that can occur while framing or reassembling the byte stream.
///
/// "Need more bytes" is never an error — incomplete frames are the normal
/// state of a live stream and are reported as `Ok(None)` by the extraction
/// APIs. These variants cover genuine protocol violations and I/O faults.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The declared payload length exceeds the configured maximum.
    #[error("declared payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The stream ended inside a declared frame.
    #[error("stream ended mid-frame ({buffered} of {needed} bytes received)")]
    UnexpectedEof { needed: usize, buffered: usize },

    /// A partial frame received no further bytes within the read timeout.
    #[error("frame stalled ({buffered} of {needed} bytes, no data within timeout)")]
    Stalled { needed: usize, buffered: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
