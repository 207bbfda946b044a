//! Transport establishment: TCP with optional TLS, behind one stream type.
//!
//! The probe owns exactly one connection per request and writes to it in
//! separately flushed phases, so `TCP_NODELAY` is set unconditionally —
//! letting the OS coalesce the split writes would erase the timing boundary
//! the crate exists to create.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::ServerName;
use tracing::debug;

use crate::protocol::HttpError;

/// A connected duplex byte stream, plain or TLS-wrapped.
#[derive(Debug)]
pub enum MaybeTlsStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

/// Opens a connection to `host:port`, TLS-wrapped when requested.
///
/// Establishment is bounded by `timeout`; every failure on this path —
/// resolution, refusal, timeout, TLS handshake — is a
/// [`HttpError::Connection`].
pub async fn connect(host: &str, port: u16, use_tls: bool, timeout: Duration) -> Result<MaybeTlsStream, HttpError> {
    let tcp = time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| HttpError::connect_timeout(timeout))?
        .map_err(HttpError::connection)?;

    tcp.set_nodelay(true).map_err(HttpError::connection)?;

    if !use_tls {
        debug!(host, port, "connected");
        return Ok(MaybeTlsStream::Plain(tcp));
    }

    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = rustls::ClientConfig::builder().with_root_certificates(root_store).with_no_client_auth();

    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| HttpError::connection(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

    let stream = connector.connect(server_name, tcp).await.map_err(HttpError::connection)?;
    debug!(host, port, "connected with tls");
    Ok(MaybeTlsStream::Tls(Box::new(stream)))
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            MaybeTlsStream::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            MaybeTlsStream::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_flush(cx),
            MaybeTlsStream::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            MaybeTlsStream::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
