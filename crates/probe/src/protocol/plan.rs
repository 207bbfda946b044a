//! Wire units of one transmission.
//!
//! A request is released to the transport in up to four units. Only the
//! last framing unit — the blank-line terminator when there is no body, the
//! final body byte when there is — is eligible for timed delay; everything
//! before it is written immediately.

use bytes::Bytes;

/// The blank line that completes the header block.
pub const TERMINATOR: &[u8] = b"\r\n\r\n";

/// A request split into its delay-eligible wire units.
///
/// `head` is the request line plus header lines, CRLF-separated, *without*
/// the final blank-line CRLF: appending [`TERMINATOR`] to it yields a
/// complete header block.
#[derive(Debug, Clone)]
pub struct TransmissionPlan {
    head: Bytes,
    body_base: Bytes,
    body_last: Option<u8>,
}

impl TransmissionPlan {
    /// Splits the serialized head and the body-to-transmit into wire units.
    ///
    /// `body` must already reflect the bodied-request rule: pass an empty
    /// buffer for GET/HEAD regardless of what the caller supplied.
    pub fn new(head: Bytes, body: Bytes) -> Self {
        match body.split_last() {
            Some((last, base)) => Self { body_last: Some(*last), body_base: body.slice(0..base.len()), head },
            None => Self { head, body_base: Bytes::new(), body_last: None },
        }
    }

    pub fn head(&self) -> &Bytes {
        &self.head
    }

    pub fn body_base(&self) -> &Bytes {
        &self.body_base
    }

    pub fn body_last(&self) -> Option<u8> {
        self.body_last
    }

    pub fn has_body(&self) -> bool {
        self.body_last.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_final_body_byte() {
        let plan = TransmissionPlan::new(Bytes::from_static(b"GET / HTTP/1.1"), Bytes::from_static(b"abc"));

        assert!(plan.has_body());
        assert_eq!(&plan.body_base()[..], b"ab");
        assert_eq!(plan.body_last(), Some(b'c'));
    }

    #[test]
    fn single_byte_body_has_empty_base() {
        let plan = TransmissionPlan::new(Bytes::new(), Bytes::from_static(b"x"));

        assert!(plan.body_base().is_empty());
        assert_eq!(plan.body_last(), Some(b'x'));
    }

    #[test]
    fn empty_body_has_no_last_byte() {
        let plan = TransmissionPlan::new(Bytes::new(), Bytes::new());

        assert!(!plan.has_body());
        assert!(plan.body_base().is_empty());
        assert_eq!(plan.body_last(), None);
    }
}
