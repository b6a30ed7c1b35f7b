use core::fmt;

/// Errors that can occur during the protocol
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The selected role is not valid for the selected mode.
    InvalidModeRole,
    /// A local input field violated its length constraints.
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The peer's message was malformed, failed deserialization, or carried
    /// a low-order element.
    ///
    /// All peer-side failure causes collapse into this one variant so that a
    /// network attacker cannot distinguish them; the specific reason is
    /// reported through the audit channel only.
    InvalidPeerElement,
    /// `start` was called on a session that already produced its element.
    AlreadyStarted,
    /// An operation that requires a started session was called before
    /// `start`.
    NotStarted,
    /// Key material was requested before the handshake completed.
    NotFinished,
    /// The suite hash output is shorter than the group field size.
    HashOutputTooShort,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidModeRole => write!(f, "role is not valid for the selected mode"),
            Error::InvalidInput { field } => write!(f, "invalid input for field {}", field),
            Error::InvalidPeerElement => write!(f, "invalid peer element"),
            Error::AlreadyStarted => write!(f, "session already started"),
            Error::NotStarted => write!(f, "session not started"),
            Error::NotFinished => write!(f, "session not finished"),
            Error::HashOutputTooShort => {
                write!(f, "hash output shorter than the group field size")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Rejection reasons produced by validated scalar multiplication and peer
/// element deserialization.
///
/// These reasons never surface through [`Error`]; they are delivered to the
/// audit sink so that operators can diagnose failures locally without
/// giving a remote peer an error oracle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointRejection {
    /// The peer element does not have the group's field size.
    BadPointLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
    /// The underlying scalar multiplication primitive failed.
    MultiplyFailed,
    /// The multiplication collapsed to the neutral element, indicating a
    /// low-order or otherwise invalid peer point.
    LowOrder,
    /// The shared secret does not have the group's field size.
    BadSharedSecretLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },
}

impl fmt::Display for PointRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointRejection::BadPointLength { expected, actual } => write!(
                f,
                "invalid point length (expected {} bytes, got {})",
                expected, actual
            ),
            PointRejection::MultiplyFailed => write!(f, "point multiplication failed"),
            PointRejection::LowOrder => {
                write!(f, "low-order result (all-zero shared secret)")
            }
            PointRejection::BadSharedSecretLength { expected, actual } => write!(
                f,
                "invalid shared secret length (expected {} bytes, got {})",
                expected, actual
            ),
        }
    }
}
