//! Unified decoder over the three body framing modes.
//!
//! Constructed from the [`PayloadKind`] the head decoder derived, then
//! driven chunk by chunk until it yields [`PayloadItem::Eof`].

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::body::until_close_decoder::UntilCloseDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadKind};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    UntilClose(UntilCloseDecoder),
}

impl PayloadDecoder {
    pub fn fixed_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose(UntilCloseDecoder::new()) }
    }
}

impl From<PayloadKind> for PayloadDecoder {
    fn from(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Length(n) => Self::fixed_length(n),
            PayloadKind::Chunked => Self::chunked(),
            PayloadKind::UntilClose => Self::until_close(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode(src),
            Kind::Chunked(decoder) => decoder.decode(src),
            Kind::UntilClose(decoder) => decoder.decode(src),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode_eof(src),
            Kind::Chunked(decoder) => decoder.decode_eof(src),
            Kind::UntilClose(decoder) => decoder.decode_eof(src),
        }
    }
}
