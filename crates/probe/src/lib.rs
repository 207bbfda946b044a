//! A precision-timed raw HTTP request transmitter.
//!
//! This crate hand-builds HTTP/1.1 requests over a raw TCP or TLS stream
//! and releases the *final framing bytes* — the blank line that terminates
//! the header block, or the last byte of the body — at an absolute
//! wall-clock instant chosen by the caller. Everything before that unit is
//! written immediately; the request becomes syntactically complete exactly
//! when the delayed unit hits the wire.
//!
//! That boundary is the product: it lets a test harness pin the moment a
//! server's request-completion detection can first trigger, to study
//! completion races, timing-sensitive middleware, or last-byte
//! synchronization behavior.
//!
//! # Features
//!
//! - Millisecond-granularity release of the completing framing unit
//! - Raw HTTP/1.1 request serialization with caller-controlled headers
//! - Plain TCP or rustls-backed TLS transports, `TCP_NODELAY` throughout
//! - Incremental response assembly across arbitrary chunk boundaries
//! - Content-Length, chunked, and until-close response body framing
//!
//! # Example
//!
//! ```no_run
//! use std::time::{Duration, SystemTime};
//!
//! use micro_probe::connection::Transmitter;
//! use micro_probe::protocol::Request;
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = SystemTime::now() + Duration::from_millis(250);
//!
//!     let request = Request::new("localhost", 8080)
//!         .path("/race")
//!         .header("X-Probe", "1")
//!         .release_at(target);
//!
//!     match Transmitter::new().send(request).await {
//!         Ok(response) => {
//!             println!("{} {}", response.status(), response.reason());
//!             println!("{}", response.body());
//!         }
//!         Err(e) => eprintln!("probe failed: {e}"),
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: plain-data vocabulary — requests, transmission plans,
//!   responses, errors
//! - [`codec`]: head serialization and the streaming response decoders
//! - [`connection`]: transport establishment, the timed write sequence, and
//!   response assembly
//! - [`schedule`]: the target-time primitive the transmitter delays with
//!
//! # Semantics worth knowing
//!
//! - One `send`, one connection: no pooling, no reuse; the socket is closed
//!   as soon as the response is assembled.
//! - GET and HEAD requests never transmit a body or a `Content-Length`
//!   header, even when a body was set on the builder.
//! - The scheduler never fires early; lateness is bounded only by runtime
//!   scheduling (a soft deadline, not a hard one).
//! - No timeout covers the response wait: a server that never completes its
//!   response parks the call indefinitely. Bound it from the outside when
//!   that matters.
//!
//! # Limitations
//!
//! - HTTP/1.1 requests only; 1.0/1.1 responses are accepted
//! - No pipelining, `Expect: 100-continue`, or chunked request bodies
//! - Response heads are capped at 64 headers / 8KB
//! - No mid-flight cancellation of a scheduled release

pub mod codec;
pub mod connection;
pub mod protocol;
pub mod schedule;

mod utils;
pub(crate) use utils::ensure;
