//! Incremental assembly of inbound chunks into one [`Response`].
//!
//! The transport hands the assembler whatever chunk sizes the socket
//! produced; boundaries carry no meaning. Everything lands in one running
//! buffer and the decoder is driven until it either needs more data or
//! reports the end of the body — at which point the response is frozen,
//! exactly once.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::ResponseDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, Response, ResponseHead};

/// State machine turning an arbitrary chunk sequence into a response.
///
/// Scoped to a single request: create one per `send`, feed it every inbound
/// chunk, call [`finish`](Self::finish) when the transport reports
/// end-of-stream.
pub struct ResponseAssembler {
    buffer: BytesMut,
    decoder: ResponseDecoder,
    head: Option<ResponseHead>,
    chunks: Vec<Bytes>,
    complete: bool,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self { buffer: BytesMut::with_capacity(4 * 1024), decoder: ResponseDecoder::new(), head: None, chunks: Vec::new(), complete: false }
    }

    /// Consumes one inbound chunk.
    ///
    /// Returns the finished response on the call that completes it, `None`
    /// while more data is needed. Feeding a completed assembler is a
    /// programmer error: the transmitter closes the socket as soon as the
    /// response exists, so nothing should still be reading.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Response>, ParseError> {
        debug_assert!(!self.complete, "fed a chunk after the response completed");
        if self.complete {
            return Ok(None);
        }

        self.buffer.extend_from_slice(chunk);
        self.drive(false)
    }

    /// End-of-stream signal from the transport.
    ///
    /// Completes an until-close body; anywhere else the close is premature
    /// and surfaces as a parse failure.
    pub fn finish(&mut self) -> Result<Option<Response>, ParseError> {
        if self.complete {
            return Ok(None);
        }

        self.drive(true)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    fn drive(&mut self, eof: bool) -> Result<Option<Response>, ParseError> {
        loop {
            let decoded = if eof { self.decoder.decode_eof(&mut self.buffer)? } else { self.decoder.decode(&mut self.buffer)? };

            match decoded {
                Some(Message::Head((head, payload_kind))) => {
                    trace!(status = head.status().as_u16(), ?payload_kind, "assembled response head");
                    self.head = Some(head);
                }
                Some(Message::Payload(PayloadItem::Chunk(bytes))) => self.chunks.push(bytes),
                Some(Message::Payload(PayloadItem::Eof)) => {
                    self.complete = true;
                    // Safe: the decoder only reaches the payload phase after
                    // yielding the head
                    let head = self.head.take().unwrap();
                    return Ok(Some(Response::assemble(head, &self.chunks)));
                }
                None => return Ok(None),
            }
        }
    }
}

impl Default for ResponseAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseAssembler")
            .field("buffered", &self.buffer.len())
            .field("head", &self.head.is_some())
            .field("complete", &self.complete)
            .finish()
    }
}
