//! The single message each party sends during a handshake.

use crate::errors::{Error, Result};
use crate::group::{CipherSuite, Group};

/// One protocol message: a serialized group element plus optional
/// associated data that is bound into the transcript but not secret.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// The serialized public element.
    pub payload: Vec<u8>,
    /// Associated data, possibly empty.
    pub ad: Vec<u8>,
}

impl Message {
    /// Construct an outbound message.
    pub fn new(payload: Vec<u8>, ad: Vec<u8>) -> Self {
        Message { payload, ad }
    }
}

/// Structurally validate an inbound message and return a fresh copy, so
/// later mutation by the caller cannot affect the transcript.
///
/// Payload length mismatches are reported through `on_invalid` with the
/// expected and observed sizes, then collapsed into
/// [`Error::InvalidPeerElement`].
pub(crate) fn validate_inbound<S: CipherSuite>(
    msg: &Message,
    mut on_invalid: impl FnMut(usize, usize),
) -> Result<Message> {
    let expected = S::G::FIELD_SIZE_BYTES;
    if msg.payload.len() != expected {
        on_invalid(expected, msg.payload.len());
        return Err(Error::InvalidPeerElement);
    }
    Ok(msg.clone())
}
