//! Length validation for caller-supplied byte fields.

use crate::errors::{Error, Result};
use rand_core::{CryptoRng, RngCore};

/// Inclusive length bounds for one input field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    /// Minimum acceptable length in bytes.
    pub min: usize,
    /// Maximum acceptable length in bytes.
    pub max: usize,
}

impl Constraint {
    /// Any length, including empty.
    pub const ANY: Constraint = Constraint {
        min: 0,
        max: usize::MAX,
    };

    /// At least one byte.
    pub const NON_EMPTY: Constraint = Constraint {
        min: 1,
        max: usize::MAX,
    };

    /// Exactly `n` bytes.
    pub const fn exact(n: usize) -> Constraint {
        Constraint { min: n, max: n }
    }
}

/// Details of a length-constraint violation, reported through the audit
/// channel. The caller-visible error only names the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: &'static str,
    /// Minimum acceptable length.
    pub min: usize,
    /// Maximum acceptable length.
    pub max: usize,
    /// The length actually supplied.
    pub actual: usize,
}

/// Check `value` against `constraint`, reporting a violation through
/// `on_violation` before returning the collapsed error.
pub(crate) fn ensure_bytes(
    field: &'static str,
    value: &[u8],
    constraint: Constraint,
    mut on_violation: impl FnMut(FieldViolation),
) -> Result<()> {
    if value.len() < constraint.min || value.len() > constraint.max {
        on_violation(FieldViolation {
            field,
            min: constraint.min,
            max: constraint.max,
            actual: value.len(),
        });
        return Err(Error::InvalidInput { field });
    }
    Ok(())
}

/// Random 16-byte correlation id, hex encoded, for audit events.
pub(crate) fn generate_session_id<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
