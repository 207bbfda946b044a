//! Body framing decoders: Content-Length, chunked, and until-close.

mod chunked_decoder;
mod length_decoder;
mod until_close_decoder;

mod payload_decoder;
pub use payload_decoder::PayloadDecoder;
