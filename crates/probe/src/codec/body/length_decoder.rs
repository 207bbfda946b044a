//! Decoder for bodies framed by a `Content-Length` header.
//!
//! Completion happens exactly when the declared number of body bytes has
//! been consumed, never earlier; a connection close before that point is a
//! parse failure, not a shorter body.

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Tracks the body bytes still owed by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let len = cmp::min(self.remaining, src.len() as u64);
        let bytes = src.split_to(len as usize).freeze();

        self.remaining -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        Err(ParseError::unexpected_eof(format!("{} declared body bytes never arrived", self.remaining)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_declared_length() {
        let mut buffer = BytesMut::from(&b"0123456789extra"[..]);
        let mut decoder = LengthDecoder::new(10);

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"0123456789");
        assert_eq!(&buffer[..], b"extra");

        // the very next call reports completion without consuming `extra`
        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
        assert_eq!(&buffer[..], b"extra");
    }

    #[test]
    fn completes_across_split_reads() {
        let mut decoder = LengthDecoder::new(4);

        let mut buffer = BytesMut::from(&b"ab"[..]);
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"ab");

        // nothing buffered yet: needs more data, not Eof
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"cd");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"cd");

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn eof_before_declared_length_is_an_error() {
        let mut buffer = BytesMut::new();
        let mut decoder = LengthDecoder::new(2);

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::UnexpectedEof { .. })));
    }
}
