//! Property tests over the encoding primitives.

use crate::bytes::{ct_eq, lexicographic_cmp};
use crate::encoding::{leb128_decode, leb128_encode, lv_cat, o_cat, prepend_len};
use core::cmp::Ordering;
use proptest::prelude::*;

proptest! {
    #[test]
    fn leb128_round_trips(n in any::<usize>()) {
        let encoded = leb128_encode(n);
        let (decoded, consumed) = leb128_decode(&encoded).unwrap();
        prop_assert_eq!(decoded, n);
        prop_assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn leb128_decoding_ignores_trailing_bytes(n in any::<usize>(), tail in proptest::collection::vec(any::<u8>(), 0..16)) {
        let mut encoded = leb128_encode(n);
        let len = encoded.len();
        encoded.extend_from_slice(&tail);
        let (decoded, consumed) = leb128_decode(&encoded).unwrap();
        prop_assert_eq!(decoded, n);
        prop_assert_eq!(consumed, len);
    }

    #[test]
    fn prepend_len_is_parseable(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let framed = prepend_len(&data);
        let (len, consumed) = leb128_decode(&framed).unwrap();
        prop_assert_eq!(len, data.len());
        prop_assert_eq!(&framed[consumed..], &data[..]);
    }

    #[test]
    fn o_cat_is_symmetric(a in proptest::collection::vec(any::<u8>(), 0..64), b in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(o_cat(&a, &b), o_cat(&b, &a));
    }

    #[test]
    fn lv_cat_distinguishes_boundaries(a in proptest::collection::vec(any::<u8>(), 0..32), b in proptest::collection::vec(any::<u8>(), 1..32)) {
        // moving a byte across the field boundary must change the encoding
        let mut a2 = a.clone();
        let mut b2 = b.clone();
        a2.push(b2.remove(0));
        prop_assert_ne!(lv_cat(&[&a, &b]), lv_cat(&[&a2, &b2]));
    }

    #[test]
    fn ct_eq_agrees_with_plain_equality(a in proptest::collection::vec(any::<u8>(), 0..64), b in proptest::collection::vec(any::<u8>(), 0..64)) {
        prop_assert_eq!(ct_eq(&a, &b), a == b);
    }

    #[test]
    fn lexicographic_cmp_is_antisymmetric(a in proptest::collection::vec(any::<u8>(), 0..32), b in proptest::collection::vec(any::<u8>(), 0..32)) {
        let forward = lexicographic_cmp(&a, &b);
        let backward = lexicographic_cmp(&b, &a);
        prop_assert_eq!(forward, backward.reverse());
        if a == b {
            prop_assert_eq!(forward, Ordering::Equal);
        }
    }
}
