//! Wire codecs: outbound head serialization and inbound response decoding.
//!
//! The outbound side is deliberately small — the probe writes raw bytes in
//! caller-controlled phases, so [`RequestEncoder`] only produces the head
//! block and the [`TransmissionPlan`](crate::protocol::TransmissionPlan)
//! carries the rest.
//!
//! The inbound side mirrors a streaming server decoder stack:
//!
//! - [`ResponseDecoder`]: head-then-payload composition
//! - head parsing via [`head_decoder`] (`httparse` underneath)
//! - body framing via [`body`] (Content-Length, chunked, until-close)
//!
//! All decoders consume a shared `BytesMut` running buffer, so inbound
//! chunks may split at any byte boundary.

mod body;
mod head_decoder;
mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
