//! Group abstraction and the X25519 production group.
//!
//! The protocol engine is written against the [`Group`] trait so that the
//! curve can be swapped without touching the session logic; the one
//! conforming implementation here is [`X25519`] with the Elligator2
//! password-to-curve map. All elements and scalars cross this boundary as
//! plain byte strings: the group owns every length check.

use crate::bytes::ct_eq;
use crate::elligator2::map_to_curve_elligator2;
use crate::encoding::generator_string;
use crate::errors::{Error, PointRejection, Result};
use curve25519_dalek::montgomery::MontgomeryPoint;
use digest::Digest;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Capability required of a CPace group.
pub trait Group {
    /// Human-readable group name.
    const NAME: &'static str;
    /// Size of a serialized element and of a scalar, in bytes.
    const FIELD_SIZE_BYTES: usize;
    /// Size of the underlying field, in bits.
    const FIELD_SIZE_BITS: usize;
    /// Input block size of the hash this group is paired with, in bytes.
    /// Controls the zero padding of the generator string.
    const S_IN_BYTES: usize;
    /// Domain-separation identifier mixed into the generator string.
    const DSI: &'static [u8];

    /// The serialized neutral element.
    fn neutral_element() -> Vec<u8>;

    /// Derive the password-keyed generator from the password-related
    /// string, channel identifier and session id.
    fn calculate_generator<D: Digest>(prs: &[u8], ci: &[u8], sid: &[u8]) -> Result<Vec<u8>>;

    /// Sample a fresh ephemeral scalar from the given CSPRNG.
    fn sample_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Zeroizing<Vec<u8>>;

    /// Plain scalar multiplication, used on locally generated elements
    /// only.
    fn scalar_mult(scalar: &[u8], element: &[u8]) -> Result<Vec<u8>>;

    /// Validated scalar multiplication, the single choke point for peer
    /// supplied elements. Implementations must reject low-order and
    /// otherwise invalid points with a specific [`PointRejection`].
    fn scalar_mult_vfy(
        scalar: &[u8],
        element: &[u8],
    ) -> core::result::Result<Vec<u8>, PointRejection>;

    /// Serialize an element, asserting its length.
    fn serialize(element: &[u8]) -> Result<Vec<u8>>;

    /// Deserialize an element received from the peer, asserting its
    /// length.
    fn deserialize(bytes: &[u8]) -> core::result::Result<Vec<u8>, PointRejection>;
}

/// A pairing of a group with the hash that keys and finalizes it.
pub trait CipherSuite {
    /// Suite identifier, e.g. `"CPACE-X25519-SHA512"`.
    const NAME: &'static str;
    /// The elliptic curve group.
    type G: Group;
    /// The hash used for generator derivation and key extraction.
    type D: Digest;
}

/// The recommended suite: X25519 with SHA-512.
pub struct CPaceX25519Sha512;

impl CipherSuite for CPaceX25519Sha512 {
    const NAME: &'static str = "CPACE-X25519-SHA512";
    type G = X25519;
    type D = sha2::Sha512;
}

/// The X25519 group: Curve25519 u-coordinates with Elligator2 generator
/// derivation, paired with a 128-byte-block hash (SHA-512).
pub struct X25519;

impl X25519 {
    /// RFC 7748 scalar multiplication with clamping, delegated to the
    /// curve25519-dalek Montgomery ladder.
    fn ladder(scalar: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
        MontgomeryPoint(*u).mul_clamped(*scalar).to_bytes()
    }

    fn fixed<const N: usize>(
        bytes: &[u8],
    ) -> core::result::Result<[u8; N], PointRejection> {
        bytes
            .try_into()
            .map_err(|_| PointRejection::BadPointLength {
                expected: N,
                actual: bytes.len(),
            })
    }
}

impl Group for X25519 {
    const NAME: &'static str = "X25519";
    const FIELD_SIZE_BYTES: usize = 32;
    const FIELD_SIZE_BITS: usize = 255;
    const S_IN_BYTES: usize = 128;
    const DSI: &'static [u8] = b"CPace255";

    fn neutral_element() -> Vec<u8> {
        vec![0u8; Self::FIELD_SIZE_BYTES]
    }

    fn calculate_generator<D: Digest>(prs: &[u8], ci: &[u8], sid: &[u8]) -> Result<Vec<u8>> {
        let gen_str = generator_string(Self::DSI, prs, ci, sid, Self::S_IN_BYTES);
        let digest = D::digest(&gen_str);
        if digest.len() < Self::FIELD_SIZE_BYTES {
            return Err(Error::HashOutputTooShort);
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest[..Self::FIELD_SIZE_BYTES]);
        Ok(map_to_curve_elligator2(&seed).to_vec())
    }

    fn sample_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Zeroizing<Vec<u8>> {
        let mut scalar = Zeroizing::new(vec![0u8; Self::FIELD_SIZE_BYTES]);
        rng.fill_bytes(&mut scalar);
        scalar
    }

    fn scalar_mult(scalar: &[u8], element: &[u8]) -> Result<Vec<u8>> {
        let k = Self::fixed::<32>(scalar).map_err(|_| Error::InvalidInput { field: "scalar" })?;
        let u = Self::fixed::<32>(element).map_err(|_| Error::InvalidInput { field: "element" })?;
        Ok(Self::ladder(&k, &u).to_vec())
    }

    fn scalar_mult_vfy(
        scalar: &[u8],
        element: &[u8],
    ) -> core::result::Result<Vec<u8>, PointRejection> {
        if element.len() != Self::FIELD_SIZE_BYTES {
            return Err(PointRejection::BadPointLength {
                expected: Self::FIELD_SIZE_BYTES,
                actual: element.len(),
            });
        }
        let mut u = Self::fixed::<32>(element)?;
        // RFC 7748 section 5: the unused most significant bit is cleared
        // before the u-coordinate is interpreted.
        u[31] &= 0x7f;

        let k = Self::fixed::<32>(scalar).map_err(|_| PointRejection::MultiplyFailed)?;
        let shared = Self::ladder(&k, &u);

        if ct_eq(&shared, &Self::neutral_element()) {
            return Err(PointRejection::LowOrder);
        }

        let mut masked = shared;
        masked[31] &= 0x7f;
        Ok(masked.to_vec())
    }

    fn serialize(element: &[u8]) -> Result<Vec<u8>> {
        if element.len() != Self::FIELD_SIZE_BYTES {
            return Err(Error::InvalidInput { field: "element" });
        }
        Ok(element.to_vec())
    }

    fn deserialize(bytes: &[u8]) -> core::result::Result<Vec<u8>, PointRejection> {
        if bytes.len() != Self::FIELD_SIZE_BYTES {
            return Err(PointRejection::BadPointLength {
                expected: Self::FIELD_SIZE_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use sha2::Sha512;

    const TC_PRS: &[u8] = b"Password";
    const TC_CI: &[u8] = b"oc\x0bB_responder\x0bA_initiator";
    const TC_SID: [u8; 16] = hex!("7e4b4791d6a8ef019b936c79fb7f2c57");

    // Appendix B.1.1: full generator derivation.
    #[test]
    fn b1_generator() {
        let g = X25519::calculate_generator::<Sha512>(TC_PRS, TC_CI, &TC_SID).unwrap();
        assert_eq!(
            g,
            hex!("64e8099e3ea682cfdc5cb665c057ebb514d06bf23ebc9f743b51b82242327074")
        );
    }

    // Appendix B.1.2/B.1.3: public elements from the fixed scalars.
    #[test]
    fn b1_public_elements() {
        let g = X25519::calculate_generator::<Sha512>(TC_PRS, TC_CI, &TC_SID).unwrap();
        let ya = hex!("21b4f4bd9e64ed355c3eb676a28ebedaf6d8f17bdc365995b319097153044080");
        let yb = hex!("848b0779ff415f0af4ea14df9dd1d3c29ac41d836c7808896c4eba19c51ac40a");
        assert_eq!(
            X25519::scalar_mult(&ya, &g).unwrap(),
            hex!("1b02dad6dbd29a07b6d28c9e04cb2f184f0734350e32bb7e62ff9dbcfdb63d15")
        );
        assert_eq!(
            X25519::scalar_mult(&yb, &g).unwrap(),
            hex!("20cda5955f82c4931545bcbf40758ce1010d7db4db2a907013d79c7a8fcf957f")
        );
    }

    // Appendix B.1.4: both sides derive the same shared element K.
    #[test]
    fn b1_shared_element() {
        let ya = hex!("21b4f4bd9e64ed355c3eb676a28ebedaf6d8f17bdc365995b319097153044080");
        let yb = hex!("848b0779ff415f0af4ea14df9dd1d3c29ac41d836c7808896c4eba19c51ac40a");
        let big_ya = hex!("1b02dad6dbd29a07b6d28c9e04cb2f184f0734350e32bb7e62ff9dbcfdb63d15");
        let big_yb = hex!("20cda5955f82c4931545bcbf40758ce1010d7db4db2a907013d79c7a8fcf957f");
        let expected = hex!("f97fdfcfff1c983ed6283856a401de3191ca919902b323c5f950c9703df7297a");

        assert_eq!(X25519::scalar_mult_vfy(&ya, &big_yb).unwrap(), expected);
        assert_eq!(X25519::scalar_mult_vfy(&yb, &big_ya).unwrap(), expected);
    }

    // Appendix B.1.10: the twelve low-order / edge u-coordinates. Low-order
    // points must be rejected; the remaining points must produce exactly
    // the draft's outputs.
    #[test]
    fn b1_low_order_points() {
        let s = hex!("af46e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449aff");

        let low_order: [[u8; 32]; 7] = [
            hex!("0000000000000000000000000000000000000000000000000000000000000000"),
            hex!("0100000000000000000000000000000000000000000000000000000000000000"),
            hex!("ecffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f"),
            hex!("e0eb7a7c3b41b8ae1656e3faf19fc46ada098deb9c32b1fd866205165f49b800"),
            hex!("5f9c95bca3508c24b1d0b1559c83ef5b04445cc4581c8e86d8224eddd09f1157"),
            hex!("edffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f"),
            hex!("eeffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f"),
        ];
        for u in &low_order {
            assert_eq!(
                X25519::scalar_mult_vfy(&s, u),
                Err(PointRejection::LowOrder)
            );
        }

        let valid: [([u8; 32], [u8; 32]); 5] = [
            (
                hex!("daffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
                hex!("d8e2c776bbacd510d09fd9278b7edcd25fc5ae9adfba3b6e040e8d3b71b21806"),
            ),
            (
                hex!("dbffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
                hex!("c85c655ebe8be44ba9c0ffde69f2fe10194458d137f09bbff725ce58803cdb38"),
            ),
            (
                hex!("d9ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
                hex!("db64dafa9b8fdd136914e61461935fe92aa372cb056314e1231bc4ec12417456"),
            ),
            (
                hex!("cdeb7a7c3b41b8ae1656e3faf19fc46ada098deb9c32b1fd866205165f49b880"),
                hex!("e062dcd5376d58297be2618c7498f55baa07d7e03184e8aada20bca28888bf7a"),
            ),
            (
                hex!("4c9c95bca3508c24b1d0b1559c83ef5b04445cc4581c8e86d8224eddd09f11d7"),
                hex!("993c6ad11c4c29da9a56f7691fd0ff8d732e49de6250b6c2e80003ff4629a175"),
            ),
        ];
        for (u, q) in &valid {
            assert_eq!(X25519::scalar_mult_vfy(&s, u).unwrap(), q);
        }
    }

    // Empty ci and sid are valid inputs and still domain-separate from
    // non-empty ones.
    #[test]
    fn generator_with_empty_context_inputs() {
        let bare = X25519::calculate_generator::<Sha512>(TC_PRS, b"", b"").unwrap();
        assert_eq!(bare.len(), 32);
        let with_ci = X25519::calculate_generator::<Sha512>(TC_PRS, TC_CI, b"").unwrap();
        let with_sid = X25519::calculate_generator::<Sha512>(TC_PRS, b"", &TC_SID).unwrap();
        assert_ne!(bare, with_ci);
        assert_ne!(bare, with_sid);
        assert_ne!(with_ci, with_sid);
    }

    // The most significant bit of a peer element is cleared before the
    // multiplication, so the two encodings are equivalent on the wire.
    #[test]
    fn vfy_masks_the_input_msb() {
        let s = hex!("af46e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449aff");
        let u = hex!("daffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff");
        let mut u_low = u;
        u_low[31] &= 0x7f;
        assert_eq!(
            X25519::scalar_mult_vfy(&s, &u).unwrap(),
            X25519::scalar_mult_vfy(&s, &u_low).unwrap()
        );
    }

    #[test]
    fn vfy_rejects_bad_lengths() {
        let s = [1u8; 32];
        assert_eq!(
            X25519::scalar_mult_vfy(&s, &[9u8; 31]),
            Err(PointRejection::BadPointLength {
                expected: 32,
                actual: 31
            })
        );
        assert!(X25519::deserialize(&[9u8; 33]).is_err());
        assert!(X25519::serialize(&[9u8; 31]).is_err());
    }

    #[test]
    fn sampled_scalars_are_full_length_and_distinct() {
        let mut rng = rand_core::OsRng;
        let a = X25519::sample_scalar(&mut rng);
        let b = X25519::sample_scalar(&mut rng);
        assert_eq!(a.len(), 32);
        assert_ne!(*a, *b);
    }
}
