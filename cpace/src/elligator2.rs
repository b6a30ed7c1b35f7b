//! Elligator2 map-to-curve for Curve25519.
//!
//! Maps a 32-byte string (interpreted as a field element with the top bit
//! masked, RFC 7748 style) to the u-coordinate of a point on Curve25519:
//!
//! ```text
//! v = -A / (1 + 2r^2)
//! e = legendre(v^3 + A*v^2 + v)
//! u = e*v - (1 - e) * (A/2)
//! ```
//!
//! The map is total: every 32-byte input produces a valid u-coordinate.
//! Field arithmetic uses five 51-bit limbs over GF(2^255 - 19); the
//! Legendre symbol is computed by exponentiation to (p-1)/2 with a fixed
//! public exponent, so only the (secret-derived) base flows through the
//! squaring chain.

/// Curve25519 Montgomery coefficient A.
const A: u64 = 486662;
/// A/2 in the field; exact since A is even.
const A_HALF: u64 = 243331;

const LOW_51_BITS: u64 = (1 << 51) - 1;

/// Field element in radix-2^51; limbs stay below 2^52 between reductions.
#[derive(Copy, Clone)]
struct Fe([u64; 5]);

const FE_ZERO: Fe = Fe([0; 5]);
const FE_ONE: Fe = Fe([1, 0, 0, 0, 0]);

impl Fe {
    /// Decode 32 little-endian bytes, masking the top bit per RFC 7748.
    fn from_bytes(bytes: &[u8; 32]) -> Fe {
        let load8 = |b: &[u8]| -> u64 {
            let mut v = 0u64;
            for (i, &byte) in b.iter().take(8).enumerate() {
                v |= (byte as u64) << (8 * i);
            }
            v
        };
        Fe([
            load8(&bytes[0..]) & LOW_51_BITS,
            (load8(&bytes[6..]) >> 3) & LOW_51_BITS,
            (load8(&bytes[12..]) >> 6) & LOW_51_BITS,
            (load8(&bytes[19..]) >> 1) & LOW_51_BITS,
            (load8(&bytes[24..]) >> 12) & LOW_51_BITS,
        ])
    }

    /// Encode to 32 little-endian bytes, fully reduced into [0, p).
    fn to_bytes(self) -> [u8; 32] {
        let mut h = self;
        h.carry();

        // Offset by 19 and propagate to detect values in [p, 2^255).
        let mut q = (h.0[0] + 19) >> 51;
        q = (h.0[1] + q) >> 51;
        q = (h.0[2] + q) >> 51;
        q = (h.0[3] + q) >> 51;
        q = (h.0[4] + q) >> 51;

        h.0[0] += 19 * q;
        for i in 0..4 {
            let carry = h.0[i] >> 51;
            h.0[i] &= LOW_51_BITS;
            h.0[i + 1] += carry;
        }
        h.0[4] &= LOW_51_BITS;

        let lo: u128 =
            (h.0[0] as u128) | ((h.0[1] as u128) << 51) | ((h.0[2] as u128) << 102);
        let hi: u128 =
            ((h.0[2] as u128) >> 26) | ((h.0[3] as u128) << 25) | ((h.0[4] as u128) << 76);

        let mut out = [0u8; 32];
        for i in 0..16 {
            out[i] = (lo >> (8 * i)) as u8;
            out[16 + i] = (hi >> (8 * i)) as u8;
        }
        out[31] &= 0x7f;
        out
    }

    /// One round of carry propagation; brings limbs below 2^52.
    fn carry(&mut self) {
        for i in 0..4 {
            let carry = self.0[i] >> 51;
            self.0[i] &= LOW_51_BITS;
            self.0[i + 1] += carry;
        }
        let carry = self.0[4] >> 51;
        self.0[4] &= LOW_51_BITS;
        self.0[0] += carry * 19; // 2^255 = 19 mod p
    }

    fn add(&self, rhs: &Fe) -> Fe {
        let mut out = [0u64; 5];
        for i in 0..5 {
            out[i] = self.0[i] + rhs.0[i];
        }
        Fe(out)
    }

    fn sub(&self, rhs: &Fe) -> Fe {
        // Offset by 2p so limbs cannot underflow.
        const TWO_P: [u64; 5] = [
            0xf_ffff_ffff_ffda,
            0xf_ffff_ffff_fffe,
            0xf_ffff_ffff_fffe,
            0xf_ffff_ffff_fffe,
            0xf_ffff_ffff_fffe,
        ];
        let mut out = [0u64; 5];
        for i in 0..5 {
            out[i] = self.0[i] + TWO_P[i] - rhs.0[i];
        }
        let mut fe = Fe(out);
        fe.carry();
        fe
    }

    fn neg(&self) -> Fe {
        FE_ZERO.sub(self)
    }

    fn mul(&self, rhs: &Fe) -> Fe {
        let (a0, a1, a2, a3, a4) = (
            self.0[0] as u128,
            self.0[1] as u128,
            self.0[2] as u128,
            self.0[3] as u128,
            self.0[4] as u128,
        );
        let (b0, b1, b2, b3, b4) = (
            rhs.0[0] as u128,
            rhs.0[1] as u128,
            rhs.0[2] as u128,
            rhs.0[3] as u128,
            rhs.0[4] as u128,
        );

        let b1_19 = b1 * 19;
        let b2_19 = b2 * 19;
        let b3_19 = b3 * 19;
        let b4_19 = b4 * 19;

        let mut r0 = a0 * b0 + a1 * b4_19 + a2 * b3_19 + a3 * b2_19 + a4 * b1_19;
        let mut r1 = a0 * b1 + a1 * b0 + a2 * b4_19 + a3 * b3_19 + a4 * b2_19;
        let mut r2 = a0 * b2 + a1 * b1 + a2 * b0 + a3 * b4_19 + a4 * b3_19;
        let mut r3 = a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0 + a4 * b4_19;
        let mut r4 = a0 * b4 + a1 * b3 + a2 * b2 + a3 * b1 + a4 * b0;

        let mask = LOW_51_BITS as u128;
        let c = r0 >> 51;
        r0 &= mask;
        r1 += c;
        let c = r1 >> 51;
        r1 &= mask;
        r2 += c;
        let c = r2 >> 51;
        r2 &= mask;
        r3 += c;
        let c = r3 >> 51;
        r3 &= mask;
        r4 += c;
        let c = r4 >> 51;
        r4 &= mask;
        r0 += c * 19;
        let c = r0 >> 51;
        r0 &= mask;
        r1 += c;

        Fe([r0 as u64, r1 as u64, r2 as u64, r3 as u64, r4 as u64])
    }

    fn square(&self) -> Fe {
        self.mul(self)
    }

    fn mul_small(&self, s: u64) -> Fe {
        let s = s as u128;
        let mask = LOW_51_BITS as u128;
        let mut r = [0u128; 5];
        for i in 0..5 {
            r[i] = (self.0[i] as u128) * s;
        }
        for i in 0..4 {
            let c = r[i] >> 51;
            r[i] &= mask;
            r[i + 1] += c;
        }
        let c = r[4] >> 51;
        r[4] &= mask;
        r[0] += c * 19;

        Fe([r[0] as u64, r[1] as u64, r[2] as u64, r[3] as u64, r[4] as u64])
    }

    fn square_n(&self, n: u32) -> Fe {
        let mut t = *self;
        for _ in 0..n {
            t = t.square();
        }
        t
    }

    /// Shared prefix of the inversion and Legendre chains:
    /// returns (self^(2^250 - 1), self^11).
    fn pow22501(&self) -> (Fe, Fe) {
        let t0 = self.square(); // 2
        let t1 = t0.square_n(2); // 8
        let t2 = self.mul(&t1); // 9
        let t3 = t0.mul(&t2); // 11
        let t4 = t3.square(); // 22
        let t5 = t2.mul(&t4); // 2^5 - 1
        let t6 = t5.square_n(5).mul(&t5); // 2^10 - 1
        let t7 = t6.square_n(10).mul(&t6); // 2^20 - 1
        let t8 = t7.square_n(20).mul(&t7); // 2^40 - 1
        let t9 = t8.square_n(10).mul(&t6); // 2^50 - 1
        let t10 = t9.square_n(50).mul(&t9); // 2^100 - 1
        let t11 = t10.square_n(100).mul(&t10); // 2^200 - 1
        let t12 = t11.square_n(50).mul(&t9); // 2^250 - 1
        (t12, t3)
    }

    /// self^(p - 2), the multiplicative inverse (maps zero to zero).
    fn invert(&self) -> Fe {
        let (t19, t3) = self.pow22501();
        // 2^255 - 21 = (2^250 - 1) * 2^5 + 11
        t19.square_n(5).mul(&t3)
    }

    /// self^((p - 1) / 2): 1 for squares, p-1 for non-squares, 0 for zero.
    fn legendre(&self) -> Fe {
        let (t19, _) = self.pow22501();
        // (p - 1) / 2 = 2^254 - 10 = ((2^250 - 1) * 4 + 1) * 4 + 2
        let t = t19.square_n(2).mul(self); // 2^252 - 3
        t.square_n(2).mul(&self.square())
    }
}

/// Map a 32-byte string to a serialized Curve25519 u-coordinate.
pub(crate) fn map_to_curve_elligator2(input: &[u8; 32]) -> [u8; 32] {
    let r = Fe::from_bytes(input);

    // v = -A / (1 + 2r^2)
    let r2 = r.square();
    let denom = FE_ONE.add(&r2.mul_small(2));
    let v = Fe([A, 0, 0, 0, 0]).mul(&denom.invert()).neg();

    // e = legendre(v^3 + A*v^2 + v)
    let v2 = v.square();
    let v3 = v2.mul(&v);
    let rhs = v3.add(&v2.mul_small(A)).add(&v);
    let e = rhs.legendre();

    // u = e*v - (1 - e) * (A/2)
    let ev = e.mul(&v);
    let one_minus_e = FE_ONE.sub(&e);
    let u = ev.sub(&one_minus_e.mul_small(A_HALF));

    u.to_bytes()
}
