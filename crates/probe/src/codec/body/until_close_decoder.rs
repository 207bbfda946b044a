//! Decoder for bodies with no declared framing.
//!
//! When a response carries neither `Content-Length` nor
//! `Transfer-Encoding: chunked`, every remaining byte on the connection is
//! body, and only the peer closing the connection marks the end. Completion
//! therefore comes from `decode_eof` — the transport's end-of-stream
//! signal — never from a byte pattern.

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UntilCloseDecoder;

impl UntilCloseDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for UntilCloseDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        Ok(Some(PayloadItem::Chunk(src.split_to(src.len()).freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(chunk) = self.decode(src)? {
            return Ok(Some(chunk));
        }
        Ok(Some(PayloadItem::Eof))
    }
}
