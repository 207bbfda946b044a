//! Protocol vocabulary for the probe.
//!
//! Plain-data types shared by the codec and connection layers:
//!
//! - [`Request`]: one raw request plus its optional release instant
//! - [`TransmissionPlan`]: the request split into delay-eligible wire units
//! - [`ResponseHead`] / [`Response`]: the parsed inbound side
//! - [`Message`] / [`PayloadItem`] / [`PayloadKind`]: decoder stream frames
//!   and the body framing modes
//! - [`HttpError`] / [`ParseError`]: the failure taxonomy
//!
//! Nothing in this module performs I/O; ownership of a `Request` and the
//! state derived from it belongs to a single in-flight `send`.

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadKind;

mod request;
pub use request::Request;

mod response;
pub use response::Response;
pub use response::ResponseHead;

mod plan;
pub use plan::TERMINATOR;
pub use plan::TransmissionPlan;

mod error;
pub use error::HttpError;
pub use error::ParseError;
