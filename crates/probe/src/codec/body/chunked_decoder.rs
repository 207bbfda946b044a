//! Decoder for `Transfer-Encoding: chunked` response bodies.
//!
//! Each chunk is a hex size line (optional extensions are skipped), CRLF,
//! the data, CRLF; a zero-size chunk followed by a bare CRLF ends the body.
//! Trailer fields after the zero chunk are rejected — the probe never asks
//! for them (`TE` is not sent) and has no use for a response that carries
//! them.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, Bytes, BytesMut};
use std::io;
use std::io::ErrorKind;
use std::task::Poll;
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining: u64,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: Size, remaining: 0 }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Position inside the chunked framing grammar. Transitions are strictly
/// forward within one chunk; `BodyLf` loops back to `Size` for the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Reading the hex chunk size
    Size,
    /// Skipping whitespace and chunk extensions up to the size line's CR
    Extension,
    /// Expecting LF after the size line
    SizeLf,
    /// Reading chunk data
    Body,
    /// Expecting CR after chunk data
    BodyCr,
    /// Expecting LF after chunk data
    BodyLf,
    /// Expecting CR directly after the zero-size chunk
    EndCr,
    /// Expecting the final LF
    EndLf,
    /// Terminal state
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let mut buf = None;

            self.state = match self.state.step(src, &mut self.remaining, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(next)) => next,
                Poll::Ready(Err(e)) => return Err(ParseError::io(e)),
            };

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        Err(ParseError::unexpected_eof("connection closed inside chunked framing"))
    }
}

macro_rules! next_byte {
    ($src:ident) => {{
        if $src.len() > 0 {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

fn invalid(reason: &'static str) -> Poll<Result<ChunkedState, io::Error>> {
    Poll::Ready(Err(io::Error::new(ErrorKind::InvalidInput, reason)))
}

impl ChunkedState {
    fn step(
        &self,
        src: &mut BytesMut,
        remaining: &mut u64,
        buf: &mut Option<Bytes>,
    ) -> Poll<Result<ChunkedState, io::Error>> {
        match self {
            Size => ChunkedState::read_size(src, remaining),
            Extension => ChunkedState::read_extension(src),
            SizeLf => ChunkedState::read_size_lf(src, remaining),
            Body => ChunkedState::read_body(src, remaining, buf),
            BodyCr => ChunkedState::expect(src, b'\r', BodyLf, "invalid chunk body CR"),
            BodyLf => ChunkedState::expect(src, b'\n', Size, "invalid chunk body LF"),
            EndCr => ChunkedState::expect(src, b'\r', EndLf, "chunk trailers are not supported"),
            EndLf => ChunkedState::expect(src, b'\n', End, "invalid chunk end LF"),
            End => Poll::Ready(Ok(End)),
        }
    }

    /// Accumulates hex digits of the chunk size until a delimiter shows up.
    fn read_size(src: &mut BytesMut, remaining: &mut u64) -> Poll<Result<ChunkedState, io::Error>> {
        let digit = match next_byte!(src) {
            b @ b'0'..=b'9' => b - b'0',
            b @ b'a'..=b'f' => b + 10 - b'a',
            b @ b'A'..=b'F' => b + 10 - b'A',
            b'\t' | b' ' | b';' => return Poll::Ready(Ok(Extension)),
            b'\r' => return Poll::Ready(Ok(SizeLf)),
            _ => return invalid("invalid chunk size line"),
        };

        match remaining.checked_mul(16).and_then(|s| s.checked_add(u64::from(digit))) {
            Some(size) => {
                *remaining = size;
                Poll::Ready(Ok(Size))
            }
            None => invalid("chunk size overflows u64"),
        }
    }

    /// Skips everything between the size digits and the size line's CRLF.
    /// A bare LF inside an extension is rejected rather than guessed at.
    fn read_extension(src: &mut BytesMut) -> Poll<Result<ChunkedState, io::Error>> {
        match next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => invalid("invalid chunk extension contains newline"),
            _ => Poll::Ready(Ok(Extension)),
        }
    }

    fn read_size_lf(src: &mut BytesMut, remaining: &mut u64) -> Poll<Result<ChunkedState, io::Error>> {
        match next_byte!(src) {
            b'\n' if *remaining == 0 => Poll::Ready(Ok(EndCr)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => invalid("invalid chunk size LF"),
        }
    }

    /// Moves as much chunk data as is buffered, up to the chunk boundary.
    fn read_body(src: &mut BytesMut, remaining: &mut u64, buf: &mut Option<Bytes>) -> Poll<Result<ChunkedState, io::Error>> {
        if src.is_empty() {
            return Poll::Ready(Ok(Body));
        }

        if *remaining == 0 {
            return Poll::Ready(Ok(BodyCr));
        }

        // min with the buffer length, so the cast back to usize is safe
        let take = std::cmp::min(*remaining, src.len() as u64) as usize;
        *remaining -= take as u64;
        *buf = Some(src.split_to(take).freeze());

        if *remaining > 0 { Poll::Ready(Ok(Body)) } else { Poll::Ready(Ok(BodyCr)) }
    }

    fn expect(
        src: &mut BytesMut,
        byte: u8,
        next: ChunkedState,
        reason: &'static str,
    ) -> Poll<Result<ChunkedState, io::Error>> {
        if next_byte!(src) == byte { Poll::Ready(Ok(next)) } else { invalid(reason) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk() {
        let mut buffer = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"1234567890abcdef");

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn two_chunks_reach_eof_at_zero_chunk() {
        // 0x1A == 26 data bytes
        let mut buffer = BytesMut::from(&b"1A\r\nabcdefghijklmnopqrstuvwxyz\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        let bytes = chunk.into_bytes().unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(&bytes[..], b"abcdefghijklmnopqrstuvwxyz");

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn chunk_split_mid_data() {
        let mut buffer = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"hel");

        buffer.extend_from_slice(b"lo\r\n0\r\n\r\n");

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"lo");

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn extensions_are_skipped() {
        let mut buffer = BytesMut::from(&b"5;name=value\r\nhello\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"hello");

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn invalid_size_is_an_error() {
        let mut buffer = BytesMut::from(&b"xyz\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn missing_data_crlf_is_an_error() {
        let mut buffer = BytesMut::from(&b"5\r\nhelloXX"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"hello");

        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn trailers_are_rejected() {
        let mut buffer = BytesMut::from(&b"0\r\nExpires: never\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode(&mut buffer).is_err());
    }

    #[test]
    fn eof_mid_framing_is_an_error() {
        let mut buffer = BytesMut::from(&b"5\r\nhe"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&chunk.into_bytes().unwrap()[..], b"he");

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::UnexpectedEof { .. })));
    }
}
