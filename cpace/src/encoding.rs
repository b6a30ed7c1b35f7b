//! Canonical encoding of protocol strings and transcripts.
//!
//! CPace binds every variable-length input into its hashes through
//! length-value concatenation: each field is prefixed with its LEB128
//! encoded length, making the concatenation injective. Transcripts come in
//! two shapes: `transcript_ir` fixes the (initiator, responder) order,
//! `transcript_oc` orders the two halves lexicographically so that both
//! peers of a symmetric session hash an identical byte string.

use crate::bytes::lexicographic_cmp;
use core::cmp::Ordering;

/// Encode a non-negative integer as unsigned LEB128: 7-bit groups emitted
/// low-order first, continuation bit set on all but the last byte.
pub fn leb128_encode(n: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(2);
    let mut v = n;
    loop {
        if v < 0x80 {
            out.push(v as u8);
            break;
        }
        out.push((v & 0x7f) as u8 | 0x80);
        v >>= 7;
    }
    out
}

/// Decode an unsigned LEB128 integer from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` when the
/// input is truncated or overflows `usize`.
pub fn leb128_decode(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut value: usize = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let group = (byte & 0x7f) as usize;
        let shift = 7 * i;
        if shift >= usize::BITS as usize || (group << shift) >> shift != group {
            return None;
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// `prepend_len(data) = leb128(len(data)) || data`.
pub fn prepend_len(data: &[u8]) -> Vec<u8> {
    let mut out = leb128_encode(data.len());
    out.extend_from_slice(data);
    out
}

/// Length-value concatenation of all `parts`; injective thanks to the
/// per-field length prefixes.
pub fn lv_cat(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(&prepend_len(part));
    }
    out
}

/// Build the generator string hashed to derive the password-keyed
/// generator.
///
/// The zero padding stretches the prefix so that the password-related
/// string always lands fully within the hash's first compression block
/// (`s_in_bytes` is the block size of the paired hash).
pub fn generator_string(
    dsi: &[u8],
    prs: &[u8],
    ci: &[u8],
    sid: &[u8],
    s_in_bytes: usize,
) -> Vec<u8> {
    let prefix_len = prepend_len(dsi).len() + prepend_len(prs).len();
    let zpad = vec![0u8; s_in_bytes.saturating_sub(1 + prefix_len)];
    lv_cat(&[dsi, prs, &zpad, ci, sid])
}

/// Byte-wise lexicographic comparison; the longer string wins ties.
pub fn lexicographically_larger(b1: &[u8], b2: &[u8]) -> bool {
    lexicographic_cmp(b1, b2) == Ordering::Greater
}

/// Ordered concatenation: `"oc"` followed by the two inputs with the
/// lexicographically larger one first. Symmetric in its arguments.
pub fn o_cat(b1: &[u8], b2: &[u8]) -> Vec<u8> {
    let (first, second) = if lexicographically_larger(b1, b2) {
        (b1, b2)
    } else {
        (b2, b1)
    };
    let mut out = Vec::with_capacity(2 + first.len() + second.len());
    out.extend_from_slice(b"oc");
    out.extend_from_slice(first);
    out.extend_from_slice(second);
    out
}

/// Initiator-responder transcript: fixed A-then-B order, no tag.
pub fn transcript_ir(ya: &[u8], ada: &[u8], yb: &[u8], adb: &[u8]) -> Vec<u8> {
    let mut out = lv_cat(&[ya, ada]);
    out.extend_from_slice(&lv_cat(&[yb, adb]));
    out
}

/// Symmetric-mode transcript: the two (element, AD) halves in canonical
/// order, so both peers derive an identical byte string.
pub fn transcript_oc(ya: &[u8], ada: &[u8], yb: &[u8], adb: &[u8]) -> Vec<u8> {
    o_cat(&lv_cat(&[ya, ada]), &lv_cat(&[yb, adb]))
}
