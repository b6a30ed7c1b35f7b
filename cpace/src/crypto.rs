//! Internal handshake steps shared by both session modes.
//!
//! These helpers sit between the [`Session`](crate::Session) state machine
//! and the [`Group`] trait: element generation, validated shared-secret
//! derivation and final key extraction.

use crate::bytes::ct_eq;
use crate::encoding::lv_cat;
use crate::errors::{Error, PointRejection, Result};
use crate::group::{CipherSuite, Group};
use digest::Digest;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Ephemeral scalar and the serialized element derived from it.
pub(crate) struct LocalElement {
    pub scalar: Zeroizing<Vec<u8>>,
    pub serialized: Vec<u8>,
}

/// Derive the password-keyed generator, sample a scalar and compute this
/// party's public element.
pub(crate) fn compute_local_element<S: CipherSuite, R: RngCore + CryptoRng>(
    rng: &mut R,
    prs: &[u8],
    ci: &[u8],
    sid: &[u8],
) -> Result<LocalElement> {
    let generator = S::G::calculate_generator::<S::D>(prs, ci, sid)?;
    let scalar = S::G::sample_scalar(rng);
    let point = S::G::scalar_mult(&scalar, &generator)?;
    let serialized = S::G::serialize(&point)?;
    Ok(LocalElement { scalar, serialized })
}

/// Derive the shared secret from the peer's payload.
///
/// Every rejection reason is handed to `on_reject` for audit reporting and
/// then collapsed into [`Error::InvalidPeerElement`], so the caller-visible
/// error carries no oracle.
pub(crate) fn derive_shared_secret<S: CipherSuite>(
    scalar: &[u8],
    peer_payload: &[u8],
    mut on_reject: impl FnMut(PointRejection),
) -> Result<Zeroizing<Vec<u8>>> {
    let peer_point = S::G::deserialize(peer_payload).map_err(|reason| {
        on_reject(reason);
        Error::InvalidPeerElement
    })?;

    let shared = S::G::scalar_mult_vfy(scalar, &peer_point).map_err(|reason| {
        on_reject(reason);
        Error::InvalidPeerElement
    })?;

    if shared.len() != S::G::FIELD_SIZE_BYTES {
        on_reject(PointRejection::BadSharedSecretLength {
            expected: S::G::FIELD_SIZE_BYTES,
            actual: shared.len(),
        });
        return Err(Error::InvalidPeerElement);
    }

    // scalar_mult_vfy already rejects the neutral element; re-check here so
    // a group implementation that forgets cannot silently yield a key an
    // attacker controls.
    if ct_eq(&shared, &S::G::neutral_element()) {
        on_reject(PointRejection::LowOrder);
        return Err(Error::InvalidPeerElement);
    }

    Ok(Zeroizing::new(shared))
}

/// Final key material: the intermediate session key and, for runs without a
/// caller-supplied session id, the sid output for follow-up protocols.
pub(crate) struct KeyOutput {
    pub isk: Vec<u8>,
    pub sid_output: Option<Vec<u8>>,
}

/// Extract ISK (and the optional sid output) from the transcript and the
/// shared group element.
pub(crate) fn derive_isk_and_sid<S: CipherSuite>(
    transcript: &[u8],
    shared_secret: &[u8],
    sid: &[u8],
) -> KeyOutput {
    let mut dsi_isk = S::G::DSI.to_vec();
    dsi_isk.extend_from_slice(b"_ISK");

    // ISK = H(lv_cat(DSI || "_ISK", sid, K) || transcript)
    let lv = lv_cat(&[&dsi_isk, sid, shared_secret]);
    let mut hasher = S::D::new();
    hasher.update(&lv);
    hasher.update(transcript);
    let isk = hasher.finalize().to_vec();

    // A session id is only produced when the caller did not supply one.
    let sid_output = if sid.is_empty() {
        let mut hasher = S::D::new();
        hasher.update(b"CPaceSidOutput");
        hasher.update(transcript);
        Some(hasher.finalize().to_vec())
    } else {
        None
    };

    KeyOutput { isk, sid_output }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{transcript_ir, transcript_oc};
    use crate::group::CPaceX25519Sha512;
    use hex_literal::hex;

    const TC_SID: [u8; 16] = hex!("7e4b4791d6a8ef019b936c79fb7f2c57");
    const K: [u8; 32] = hex!("f97fdfcfff1c983ed6283856a401de3191ca919902b323c5f950c9703df7297a");
    const YA: [u8; 32] = hex!("1b02dad6dbd29a07b6d28c9e04cb2f184f0734350e32bb7e62ff9dbcfdb63d15");
    const YB: [u8; 32] = hex!("20cda5955f82c4931545bcbf40758ce1010d7db4db2a907013d79c7a8fcf957f");

    // Appendix B.1.5: ISK for the initiator/responder transcript.
    #[test]
    fn b1_isk_initiator_responder() {
        let transcript = transcript_ir(&YA, b"ADa", &YB, b"ADb");
        let out = derive_isk_and_sid::<CPaceX25519Sha512>(&transcript, &K, &TC_SID);
        assert_eq!(
            out.isk,
            hex!(
                "a051ee5ee2499d16da3f69f430218b8ea94a18a45b67f9e86495b382c33d14a5"
                "c38cecc0cc834f960e39e0d1bf7d76b9ef5d54eecc5e0f386c97ad12da8c3d5f"
            )
        );
        assert!(out.sid_output.is_none());
    }

    // Appendix B.1.7: ISK for the symmetric (ordered) transcript.
    #[test]
    fn b1_isk_symmetric() {
        let transcript = transcript_oc(&YA, b"ADa", &YB, b"ADb");
        let out = derive_isk_and_sid::<CPaceX25519Sha512>(&transcript, &K, &TC_SID);
        assert_eq!(
            out.isk,
            hex!(
                "5cc27e49679423f81a37d7521d9fb1327c840d2ea4a1543652e7de5cabb89eba"
                "d27d24761b3288a3fd5764b441ecb78d30abc26161ff45ea297bb311dde04727"
            )
        );
    }

    // With an empty sid the run additionally yields a 64-byte sid output
    // bound to the transcript.
    #[test]
    fn empty_sid_produces_sid_output() {
        let transcript = transcript_ir(&YA, b"ADa", &YB, b"ADb");
        let out = derive_isk_and_sid::<CPaceX25519Sha512>(&transcript, &K, &[]);
        let sid_out = out.sid_output.expect("sid output for empty sid");
        assert_eq!(sid_out.len(), 64);
        assert_eq!(
            sid_out,
            hex!(
                "f7ae11ac3ee85c3c42d8bd51ba823fbe17158f43d34a1296f1cb2567bcc71dc8"
                "b201a134b566b468aad8fd04f02f96e3caf9d5601f7ed760a0a951a5a861b5e7"
            )
        );

        let transcript = transcript_oc(&YA, b"ADa", &YB, b"ADb");
        let out = derive_isk_and_sid::<CPaceX25519Sha512>(&transcript, &K, &[]);
        assert_eq!(
            out.sid_output.unwrap(),
            hex!(
                "a38389e34fa492788c1df43b06b427710491174e53c33b01362a490d116fe1b7"
                "e870aa6e2a7fc018725e3b7f969f7508042e44cd3863f39aa75026a190d1902b"
            )
        );
    }

    #[test]
    fn rejections_collapse_and_reach_the_callback() {
        let scalar = [7u8; 32];
        let mut seen = Vec::new();

        let short = derive_shared_secret::<CPaceX25519Sha512>(&scalar, &[0u8; 31], |r| {
            seen.push(r)
        });
        assert_eq!(short.unwrap_err(), Error::InvalidPeerElement);

        let neutral = derive_shared_secret::<CPaceX25519Sha512>(&scalar, &[0u8; 32], |r| {
            seen.push(r)
        });
        assert_eq!(neutral.unwrap_err(), Error::InvalidPeerElement);

        assert_eq!(
            seen,
            vec![
                PointRejection::BadPointLength {
                    expected: 32,
                    actual: 31
                },
                PointRejection::LowOrder,
            ]
        );
    }
}
