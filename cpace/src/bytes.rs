//! Byte-string utilities shared by the encoding and group layers.

use core::cmp::Ordering;
use subtle::ConstantTimeEq;

/// Compare two byte strings lexicographically by unsigned byte value,
/// breaking ties by length.
///
/// This ordering is used for transcript canonicalization only. It is not
/// constant time and must never be used to compare secrets.
pub fn lexicographic_cmp(a: &[u8], b: &[u8]) -> Ordering {
    let common = a.len().min(b.len());
    for i in 0..common {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Fixed-work equality check for byte strings.
///
/// Branches only on the (public) lengths; the content comparison runs over
/// every byte regardless of where the first difference occurs.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
