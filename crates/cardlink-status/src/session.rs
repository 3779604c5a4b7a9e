use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use cardlink_frame::{FrameAssembler, FrameConfig, FrameError};
use futures_core::Stream;
use tokio::sync::mpsc;
use tokio::time::Sleep;
use tracing::warn;

use crate::decode::decode_status;
use crate::message::StatusMessage;

/// Decodes one chunked byte source into an ordered sequence of status
/// messages.
///
/// One session per source. The session is pull-driven — the consumer
/// controls the pace — and strictly ordered: frames are extracted and
/// decoded in the order their bytes arrived, with every frame a chunk
/// completes drained before more input is awaited. Payloads matching no
/// recognized message shape are skipped and the session keeps reading.
///
/// The sequence ends with `None` when the sender side is dropped or the
/// producer is cancelled; trailing partial bytes are logged, not raised.
/// `Err` items are reserved for protocol violations: a declared length
/// over the configured maximum, or a partial frame that receives no bytes
/// within [`FrameConfig::read_timeout`]. A session that has reported a
/// violation should be dropped — the byte stream can no longer be trusted.
pub struct StatusSession {
    source: mpsc::Receiver<Bytes>,
    assembler: FrameAssembler,
    read_timeout: Option<Duration>,
    stall: Option<Pin<Box<Sleep>>>,
}

impl StatusSession {
    /// Create a session over a chunk channel with default configuration.
    pub fn new(source: mpsc::Receiver<Bytes>) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    /// Create a session with explicit framing configuration.
    pub fn with_config(source: mpsc::Receiver<Bytes>, config: FrameConfig) -> Self {
        Self {
            source,
            assembler: FrameAssembler::with_max_payload(config.max_payload_size),
            read_timeout: config.read_timeout,
            stall: None,
        }
    }

    /// Pull the next decoded message.
    pub async fn next_message(&mut self) -> Option<Result<StatusMessage, FrameError>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Bytes currently sitting in the reassembly buffer.
    pub fn buffered(&self) -> usize {
        self.assembler.buffered()
    }
}

/// Create a byte-chunk channel and a session reading from it.
pub fn channel(capacity: usize) -> (mpsc::Sender<Bytes>, StatusSession) {
    channel_with_config(capacity, FrameConfig::default())
}

/// Create a byte-chunk channel and a session with explicit configuration.
pub fn channel_with_config(
    capacity: usize,
    config: FrameConfig,
) -> (mpsc::Sender<Bytes>, StatusSession) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, StatusSession::with_config(rx, config))
}

impl Stream for StatusSession {
    type Item = Result<StatusMessage, FrameError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            // Drain every frame the buffer already completes before asking
            // for more bytes.
            loop {
                match this.assembler.try_next() {
                    Err(err) => return Poll::Ready(Some(Err(err))),
                    Ok(Some(payload)) => {
                        if let Some(message) = decode_status(&payload) {
                            this.stall = None;
                            return Poll::Ready(Some(Ok(message)));
                        }
                        // Unrecognized payload: its frame is consumed, no
                        // element is emitted.
                    }
                    Ok(None) => break,
                }
            }

            match this.source.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => {
                    this.assembler.push(&chunk);
                    this.stall = None;
                }
                Poll::Ready(None) => {
                    if let Some((needed, buffered)) = this.assembler.pending_frame() {
                        warn!(
                            needed,
                            buffered, "source closed mid-frame; discarding partial frame"
                        );
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => {
                    if let Some((needed, buffered)) = this.assembler.pending_frame() {
                        if let Some(timeout) = this.read_timeout {
                            let stall = this
                                .stall
                                .get_or_insert_with(|| Box::pin(tokio::time::sleep(timeout)));
                            if stall.as_mut().poll(cx).is_ready() {
                                this.stall = None;
                                return Poll::Ready(Some(Err(FrameError::Stalled {
                                    needed,
                                    buffered,
                                })));
                            }
                        }
                    }
                    return Poll::Pending;
                }
            }
        }
    }
}
