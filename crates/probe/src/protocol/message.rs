use bytes::{Buf, Bytes};

/// A decoded frame of an inbound HTTP response stream.
///
/// The response decoder yields exactly one `Head` frame, followed by zero or
/// more `Payload` frames ending with [`PayloadItem::Eof`].
pub enum Message<T, Data: Buf = Bytes> {
    /// The parsed response head (status line plus header block)
    Head(T),
    /// A chunk of body data or the end-of-body marker
    Payload(PayloadItem<Data>),
}

/// An item in the decoded body stream: a chunk of bytes or the end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    Eof,
}

/// How the end of a response body is determined.
///
/// Decided once, from the completed header block, and never revisited:
/// a declared byte count, chunked transfer framing, or — when neither
/// header is present — the close of the underlying connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    /// `Content-Length` is present: the body is exactly this many bytes
    Length(u64),
    /// `Transfer-Encoding: chunked`: the body ends at the zero-size chunk
    Chunked,
    /// Neither header: the body ends when the peer closes the connection
    UntilClose,
}

impl PayloadKind {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadKind::Chunked)
    }

    #[inline]
    pub fn is_until_close(&self) -> bool {
        matches!(self, PayloadKind::UntilClose)
    }
}

impl<T> Message<T> {
    #[inline]
    pub fn is_head(&self) -> bool {
        matches!(self, Message::Head(_))
    }

    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns the contained bytes, or `None` for the EOF marker.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the item and returns the contained bytes, if any.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
