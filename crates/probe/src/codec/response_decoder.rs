//! Composed decoder for one full HTTP response.
//!
//! Two-phase state machine in the shape of its sibling encoders/decoders:
//! while `payload_decoder` is `None` the head is still being parsed; once
//! the head completes, the derived [`PayloadDecoder`] takes over until it
//! reports [`PayloadItem::Eof`]. States only ever move forward.

use crate::codec::body::PayloadDecoder;
use crate::codec::head_decoder::HeadDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadKind, ResponseHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

pub struct ResponseDecoder {
    head_decoder: HeadDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { head_decoder: HeadDecoder, payload_decoder: None }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, PayloadKind)>;
    type Error = ParseError;

    /// - `Ok(Some(Message::Head(_)))`: the head block finished parsing
    /// - `Ok(Some(Message::Payload(_)))`: a body chunk, or end of body
    /// - `Ok(None)`: need more data
    /// - `Err(_)`: the bytes cannot be a well-formed response
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    // this response is done; drop the body state with it
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.head_decoder.decode(src)? {
            Some((head, payload_kind)) => {
                self.payload_decoder = Some(payload_kind.into());
                Some(Message::Head((head, payload_kind)))
            }
            None => None,
        };

        Ok(message)
    }

    /// End-of-stream signal from the transport.
    ///
    /// Completes until-close bodies; anywhere else a close means the peer
    /// quit mid-message and the response cannot be assembled.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode_eof(src)? {
                Some(item @ PayloadItem::Eof) => {
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                None => None,
            };

            return Ok(message);
        }

        if src.is_empty() {
            return Err(ParseError::unexpected_eof("connection closed before the response head"));
        }

        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None => Err(ParseError::unexpected_eof("connection closed inside the response head")),
        }
    }
}
