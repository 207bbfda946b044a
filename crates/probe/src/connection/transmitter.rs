//! The timed request transmitter.
//!
//! One [`send`](Transmitter::send) call owns one connection for its whole
//! lifetime: connect, write the request in phases, assemble the response,
//! tear the connection down. The phase boundaries are the point — the bulk
//! of the request goes out immediately, while the final framing unit (the
//! blank-line terminator, or the last body byte) can be held back until an
//! absolute target time, pinning the instant the server can first see the
//! request as complete.

use std::io;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::codec::RequestEncoder;
use crate::connection::ResponseAssembler;
use crate::connection::stream::connect;
use crate::protocol::{HttpError, ParseError, Request, Response, TERMINATOR, TransmissionPlan};
use crate::schedule;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const READ_BUF_SIZE: usize = 4 * 1024;

/// Sends [`Request`]s with timed delivery of their final framing bytes.
///
/// Stateless between calls apart from configuration; every `send` opens a
/// fresh connection and never reuses it.
///
/// # Example
///
/// ```no_run
/// use std::time::{Duration, SystemTime};
/// use micro_probe::connection::Transmitter;
/// use micro_probe::protocol::Request;
///
/// # async fn run() -> Result<(), micro_probe::protocol::HttpError> {
/// let request = Request::new("localhost", 8080)
///     .release_at(SystemTime::now() + Duration::from_millis(50));
///
/// let response = Transmitter::new().send(request).await?;
/// println!("{} {}", response.status(), response.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Transmitter {
    connect_timeout: Duration,
}

impl Transmitter {
    pub fn new() -> Self {
        Self { connect_timeout: DEFAULT_CONNECT_TIMEOUT }
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// Transmits `request` and assembles the peer's response.
    ///
    /// Fails with [`HttpError::Connection`] when no transport could be
    /// established, [`HttpError::Transport`] when the established
    /// connection errors before a response is assembled, and
    /// [`HttpError::Parse`] when the inbound bytes are not a well-formed
    /// response. There is no partial-success outcome and nothing is
    /// retried.
    pub async fn send(&self, request: Request) -> Result<Response, HttpError> {
        let stream = connect(request.host(), request.port(), request.use_tls(), self.connect_timeout).await?;

        let head = RequestEncoder.encode(&request);
        let body = if request.is_bodied() { request.body_ref().clone() } else { Bytes::new() };
        let plan = TransmissionPlan::new(head, body);

        let (reader, mut writer) = tokio::io::split(stream);

        // armed before the first outbound byte: a peer may answer at any
        // point of the transmission
        let read_task = tokio::spawn(read_response(reader));

        let written = transmit(&mut writer, &plan, request.target_time()).await;

        let result = match read_task.await {
            // a completed response outranks a write error: the peer already
            // answered, so the error was not "before a response"
            Ok(Ok(response)) => Ok(response),
            Ok(Err(read_error)) => match written {
                // the write-side failure is the root cause; the read side
                // only saw its fallout
                Err(write_error) => Err(write_error),
                Ok(()) => Err(read_error),
            },
            Err(join_error) => Err(HttpError::transport(io::Error::other(join_error))),
        };

        // no reuse: the connection dies with the call, on every path
        let _ = writer.shutdown().await;
        result
    }
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the wire units in order, delaying the final framing unit to the
/// target time when one is set.
///
/// Each phase is flushed on its own; with `TCP_NODELAY` on the socket, the
/// phase boundary is a wire boundary.
async fn transmit<W>(writer: &mut W, plan: &TransmissionPlan, target_time: Option<SystemTime>) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    write_unit(writer, plan.head()).await?;
    trace!(len = plan.head().len(), "wrote head bytes");

    // the terminator is the completing unit only for body-less requests
    if let (Some(target), false) = (target_time, plan.has_body()) {
        schedule::wait_until(target).await;
    }
    write_unit(writer, TERMINATOR).await?;
    debug!(delayed = target_time.is_some() && !plan.has_body(), "header block on the wire");

    if let Some(last) = plan.body_last() {
        if !plan.body_base().is_empty() {
            write_unit(writer, plan.body_base()).await?;
            trace!(len = plan.body_base().len(), "wrote body bytes");
        }

        if let Some(target) = target_time {
            schedule::wait_until(target).await;
        }
        write_unit(writer, &[last]).await?;
        debug!(delayed = target_time.is_some(), "final body byte on the wire");
    }

    Ok(())
}

async fn write_unit<W>(writer: &mut W, bytes: &[u8]) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await.map_err(HttpError::transport)?;
    writer.flush().await.map_err(HttpError::transport)
}

/// Feeds every inbound chunk to a fresh assembler until it completes or
/// the peer closes the connection.
async fn read_response<R>(mut reader: R) -> Result<Response, HttpError>
where
    R: AsyncRead + Unpin,
{
    let mut assembler = ResponseAssembler::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        let read = reader.read(&mut buf).await.map_err(HttpError::transport)?;

        if read == 0 {
            return match assembler.finish()? {
                Some(response) => Ok(response),
                None => Err(ParseError::unexpected_eof("connection closed before the response was complete").into()),
            };
        }

        trace!(len = read, "received chunk");
        if let Some(response) = assembler.feed(&buf[..read])? {
            return Ok(response);
        }
    }
}
