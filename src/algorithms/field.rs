//! Prime field arithmetic over the scalar field of an elliptic curve
//!
//! A [`FiniteField`] is an explicit, immutable value holding the prime modulus and the byte order used
//! to encode its elements. Each [`FieldElement`] carries the field it belongs to, so that a scalar of the
//! ed25519 group can never be silently combined with a scalar of the secp256k1 group.
//!
//! Elements are always fully reduced. They are serialized as 32 byte arrays, and evaluation points
//! ("indices") of secret sharing are serialized as 8 byte arrays, both in the byte order of the field.
//!
//! ```text
//!   ed25519:   l = 2^252 + 27742317777372353535851937790883648493, little-endian
//!   secp256k1: n = FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFE BAAEDCE6 AF48A03B BFD25E8C D0364141, big-endian
//! ```
use crate::error::TssError;
use crate::protocol::Endianness;
use curv::arithmetic::traits::{Converter, Modulo, Samplable};
use curv::BigInt;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

/// Width of a serialized field element
pub const ELEMENT_LENGTH: usize = 32;
/// Width of a serialized evaluation point
pub const INDEX_LENGTH: usize = 8;

const ED25519_ORDER: [u8; 32] = [
    0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x14, 0xde, 0xf9, 0xde, 0xa2, 0xf7, 0x9c, 0xd6, 0x58, 0x12, 0x63, 0x1a, 0x5c, 0xf5, 0xd3, 0xed,
];

const SECP256K1_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

// a draw of 8 random bytes is zero or collides with a handful of known points with negligible probability
const MAX_ITERATIONS_IN_INDEX_SAMPLING: usize = 64;

#[derive(PartialEq, Eq)]
struct FieldParams {
    modulus: BigInt,
    endianness: Endianness,
}

/// Scalar field of a curve: a prime modulus together with the encoding byte order
#[derive(Clone)]
pub struct FiniteField(Arc<FieldParams>);

impl FiniteField {
    /// Creates a field for the given prime modulus.
    ///
    /// # Panics
    /// The modulus must be greater than 2 and fit into 256 bits. Primality is not checked.
    pub fn new(modulus: BigInt, endianness: Endianness) -> Self {
        assert!(
            modulus > BigInt::from(2u32) && strip_zeros(&modulus.to_bytes()).len() <= ELEMENT_LENGTH,
            "field modulus must be a prime greater than 2 that fits into {} bytes",
            ELEMENT_LENGTH
        );
        FiniteField(Arc::new(FieldParams {
            modulus,
            endianness,
        }))
    }

    /// Order of the ed25519 prime subgroup, little-endian encoding
    pub fn ed25519() -> Self {
        Self::new(BigInt::from_bytes(&ED25519_ORDER), Endianness::Little)
    }

    /// Order of the secp256k1 group, big-endian encoding
    pub fn secp256k1() -> Self {
        Self::new(BigInt::from_bytes(&SECP256K1_ORDER), Endianness::Big)
    }

    pub fn modulus(&self) -> &BigInt {
        &self.0.modulus
    }

    pub fn endianness(&self) -> Endianness {
        self.0.endianness
    }

    pub fn zero(&self) -> FieldElement {
        self.element(BigInt::from(0u32))
    }

    pub fn one(&self) -> FieldElement {
        self.element(BigInt::from(1u32))
    }

    pub fn from_u64(&self, value: u64) -> FieldElement {
        self.from_bigint(&BigInt::from(value))
    }

    pub fn from_bigint(&self, value: &BigInt) -> FieldElement {
        self.element(value.modulus(self.modulus()))
    }

    /// Reduces bytes of any length, read in the byte order of the field.
    pub fn norm(&self, bytes: &[u8]) -> FieldElement {
        self.from_bigint(&BigInt::from_bytes(&self.to_big_endian(bytes)))
    }

    /// Reduces bytes of any length and encodes the result at the width of the input.
    pub fn normalize(&self, bytes: &[u8]) -> Vec<u8> {
        self.encode(&self.norm(bytes).value, bytes.len())
            .expect("a reduced value never outgrows its unreduced encoding")
    }

    /// Decodes a canonical element: exactly 32 bytes holding a value below the modulus.
    pub fn decode(&self, bytes: &[u8]) -> Result<FieldElement, TssError> {
        if bytes.len() != ELEMENT_LENGTH {
            return Err(TssError::length("field element", ELEMENT_LENGTH, bytes.len()));
        }
        let value = BigInt::from_bytes(&self.to_big_endian(bytes));
        if &value >= self.modulus() {
            return Err(TssError::InvalidFormat(
                "field element is not reduced".to_string(),
            ));
        }
        Ok(self.element(value))
    }

    /// Decodes an evaluation point: exactly 8 bytes, non-zero.
    pub fn index(&self, bytes: &[u8]) -> Result<FieldElement, TssError> {
        if bytes.len() != INDEX_LENGTH {
            return Err(TssError::length("share index", INDEX_LENGTH, bytes.len()));
        }
        let index = self.norm(bytes);
        if index.is_zero() {
            return Err(TssError::InvalidFormat(
                "share index must not be zero".to_string(),
            ));
        }
        Ok(index)
    }

    /// Uniformly random element
    pub fn rand(&self) -> FieldElement {
        self.element(BigInt::sample_below(self.modulus()))
    }

    /// Uniformly random element of `[1, q)`
    pub fn rand_nonzero(&self) -> FieldElement {
        let below = self.modulus() - &BigInt::from(1u32);
        self.element(BigInt::sample_below(&below) + BigInt::from(1u32))
    }

    /// Random non-zero 8 byte evaluation point which differs from every point in `taken`.
    pub fn rand_index(&self, taken: &[FieldElement]) -> Result<FieldElement, TssError> {
        let mut bytes = [0u8; INDEX_LENGTH];
        for _ in 0..MAX_ITERATIONS_IN_INDEX_SAMPLING {
            OsRng.fill_bytes(&mut bytes);
            let candidate = self.norm(&bytes);
            if !candidate.is_zero() && !taken.iter().any(|x| x == &candidate) {
                return Ok(candidate);
            }
        }
        Err(TssError::InvalidFormat(
            "could not sample a fresh share index".to_string(),
        ))
    }

    fn element(&self, value: BigInt) -> FieldElement {
        FieldElement {
            value,
            field: self.clone(),
        }
    }

    fn to_big_endian(&self, bytes: &[u8]) -> Vec<u8> {
        let mut be = bytes.to_vec();
        if self.endianness() == Endianness::Little {
            be.reverse();
        }
        be
    }

    fn encode(&self, value: &BigInt, len: usize) -> Option<Vec<u8>> {
        let be = value.to_bytes();
        let be = strip_zeros(&be);
        if be.len() > len {
            return None;
        }
        let mut out = vec![0u8; len];
        out[len - be.len()..].copy_from_slice(be);
        if self.endianness() == Endianness::Little {
            out.reverse();
        }
        Some(out)
    }
}

impl PartialEq for FiniteField {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for FiniteField {}

impl fmt::Debug for FiniteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FiniteField {{ modulus: {}, endianness: {} }}",
            hex::encode(self.modulus().to_bytes()),
            self.endianness()
        )
    }
}

fn strip_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Reduced element of a [`FiniteField`]
///
/// Immutable value: every operation returns a new element.
#[derive(Clone)]
pub struct FieldElement {
    value: BigInt,
    field: FiniteField,
}

impl FieldElement {
    pub fn field(&self) -> &FiniteField {
        &self.field
    }

    pub fn to_bigint(&self) -> BigInt {
        self.value.clone()
    }

    pub fn is_zero(&self) -> bool {
        self.value == BigInt::from(0u32)
    }

    /// 32 byte encoding in the byte order of the field
    pub fn to_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        let encoded = self
            .field
            .encode(&self.value, ELEMENT_LENGTH)
            .expect("field modulus fits into 32 bytes");
        let mut out = [0u8; ELEMENT_LENGTH];
        out.copy_from_slice(&encoded);
        out
    }

    /// Encoding at an arbitrary width, fails if the value does not fit
    pub fn encode(&self, len: usize) -> Result<Vec<u8>, TssError> {
        self.field.encode(&self.value, len).ok_or_else(|| {
            TssError::InvalidFormat(format!("field element does not fit into {} bytes", len))
        })
    }

    /// 8 byte encoding used for evaluation points
    pub fn to_index_bytes(&self) -> Result<[u8; INDEX_LENGTH], TssError> {
        let encoded = self.encode(INDEX_LENGTH)?;
        let mut out = [0u8; INDEX_LENGTH];
        out.copy_from_slice(&encoded);
        Ok(out)
    }

    pub fn inv(&self) -> Result<Self, TssError> {
        BigInt::mod_inv(&self.value, self.field.modulus())
            .map(|value| self.field.element(value))
            .ok_or(TssError::NotInvertible)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(&self, rhs: &FieldElement) -> Result<Self, TssError> {
        Ok(self * &rhs.inv()?)
    }

    pub fn sqr(&self) -> Self {
        self * self
    }

    pub fn pow(&self, exponent: u64) -> Self {
        self.pow_bigint(&BigInt::from(exponent))
    }

    pub fn pow_element(&self, exponent: &FieldElement) -> Self {
        self.pow_bigint(&exponent.value)
    }

    fn pow_bigint(&self, exponent: &BigInt) -> Self {
        self.field
            .element(BigInt::mod_pow(&self.value, exponent, self.field.modulus()))
    }

    /// Square root by Tonelli-Shanks, `None` for quadratic non-residues
    pub fn sqrt(&self) -> Option<Self> {
        let p = self.field.modulus();
        let one = BigInt::from(1u32);
        let two = BigInt::from(2u32);
        if self.is_zero() {
            return Some(self.clone());
        }
        let p_minus_one = p - &one;
        let half = &p_minus_one / &two;
        if BigInt::mod_pow(&self.value, &half, p) != one {
            return None;
        }

        // p - 1 = q * 2^s with q odd
        let mut q = p_minus_one.clone();
        let mut s = 0u32;
        while &q % &two == BigInt::from(0u32) {
            q = &q / &two;
            s += 1;
        }

        let mut z = two.clone();
        while BigInt::mod_pow(&z, &half, p) != p_minus_one {
            z = &z + &one;
        }

        let mut m = s;
        let mut c = BigInt::mod_pow(&z, &q, p);
        let mut t = BigInt::mod_pow(&self.value, &q, p);
        let mut r = BigInt::mod_pow(&self.value, &((&q + &one) / &two), p);
        while t != one {
            let mut i = 0u32;
            let mut t2i = t.clone();
            while t2i != one {
                t2i = BigInt::mod_mul(&t2i, &t2i, p);
                i += 1;
                if i == m {
                    return None;
                }
            }
            let mut b = c.clone();
            for _ in 0..(m - i - 1) {
                b = BigInt::mod_mul(&b, &b, p);
            }
            m = i;
            c = BigInt::mod_mul(&b, &b, p);
            t = BigInt::mod_mul(&t, &c, p);
            r = BigInt::mod_mul(&r, &b, p);
        }
        Some(self.field.element(r))
    }

    /// Comparison of the encodings which does not short-circuit on the first differing byte
    pub fn equal(&self, other: &FieldElement) -> bool {
        self.to_bytes()
            .iter()
            .zip(other.to_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    fn assert_same_field(&self, other: &FieldElement) {
        assert!(
            self.field == other.field,
            "arithmetic on elements of different fields"
        );
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.equal(other)
    }
}

impl Eq for FieldElement {}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

macro_rules! impl_field_op {
    ($trait:ident, $method:ident, $op:path) => {
        impl<'a, 'b> $trait<&'b FieldElement> for &'a FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: &'b FieldElement) -> FieldElement {
                self.assert_same_field(rhs);
                self.field
                    .element($op(&self.value, &rhs.value, self.field.modulus()))
            }
        }

        impl<'b> $trait<&'b FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: &'b FieldElement) -> FieldElement {
                (&self).$method(rhs)
            }
        }

        impl $trait<FieldElement> for FieldElement {
            type Output = FieldElement;

            fn $method(self, rhs: FieldElement) -> FieldElement {
                (&self).$method(&rhs)
            }
        }
    };
}

impl_field_op!(Add, add, BigInt::mod_add);
impl_field_op!(Sub, sub, BigInt::mod_sub);
impl_field_op!(Mul, mul, BigInt::mod_mul);

impl<'a> Neg for &'a FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        &self.field.zero() - self
    }
}

impl Neg for FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FiniteField> {
        vec![FiniteField::ed25519(), FiniteField::secp256k1()]
    }

    #[test]
    fn homomorphisms() -> anyhow::Result<()> {
        for field in fields() {
            for _ in 0..8 {
                let a = field.rand();
                let b = field.rand_nonzero();

                assert_eq!(&a + &b, &b + &a);
                assert_eq!(&a + &(-&b), &a - &b);
                assert_eq!(&a * &b.inv()?, a.div(&b)?);
                assert_eq!(a.div(&b)? * &b, a);
                assert_eq!(a.pow(2), &a * &a);
                assert_eq!(a.sqr(), a.pow(2));
                assert_eq!(a.pow(3), a.pow_element(&field.from_u64(3)));
                assert_eq!(&a - &a, field.zero());
            }
        }
        Ok(())
    }

    #[test]
    fn square_roots() {
        for field in fields() {
            for _ in 0..4 {
                let a = field.rand();
                let square = a.sqr();
                let root = square.sqrt().expect("a square has a root");
                assert_eq!(root.sqr(), square);
                assert!(root == a || root == -&a);
            }
        }
    }

    #[test]
    fn non_residue_has_no_root() {
        let field = FiniteField::new(BigInt::from(13u32), Endianness::Big);
        // squares mod 13 are {1, 3, 4, 9, 10, 12}
        assert!(field.from_u64(2).sqrt().is_none());
        assert_eq!(field.from_u64(10).sqrt().map(|r| r.sqr()), Some(field.from_u64(10)));
    }

    #[test]
    fn zero_is_not_invertible() {
        for field in fields() {
            assert_eq!(field.zero().inv(), Err(TssError::NotInvertible));
            assert!(field.one().div(&field.zero()).is_err());
        }
    }

    #[test]
    fn norm_reduces_and_keeps_width() {
        for field in fields() {
            let q = field.modulus().clone();
            let mut be = q.to_bytes();
            if field.endianness() == Endianness::Little {
                be.reverse();
            }
            assert!(field.norm(&be).is_zero());
            assert_eq!(field.normalize(&be), vec![0u8; 32]);

            let wide = [0xffu8; 64];
            assert_eq!(field.normalize(&wide).len(), 64);
            assert_eq!(field.normalize(&[7u8; 8]).len(), 8);
            assert_eq!(field.normalize(&[7u8; 8]), vec![7u8; 8]);
        }
    }

    #[test]
    fn encodings_follow_endianness() {
        let ed = FiniteField::ed25519();
        let mut expected = [0u8; 32];
        expected[0] = 1;
        assert_eq!(ed.one().to_bytes(), expected);
        assert_eq!(ed.from_u64(1).to_index_bytes(), Ok([1, 0, 0, 0, 0, 0, 0, 0]));

        let secp = FiniteField::secp256k1();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(secp.one().to_bytes(), expected);
        assert_eq!(secp.from_u64(1).to_index_bytes(), Ok([0, 0, 0, 0, 0, 0, 0, 1]));
    }

    #[test]
    fn strict_decoding() {
        for field in fields() {
            assert!(matches!(
                field.decode(&[1u8; 31]),
                Err(TssError::InvalidLength { .. })
            ));
            assert!(matches!(
                field.decode(&[0xffu8; 32]),
                Err(TssError::InvalidFormat(_))
            ));
            let a = field.rand();
            assert_eq!(field.decode(&a.to_bytes()), Ok(a));

            assert!(field.index(&[0u8; 8]).is_err());
            assert!(field.index(&[1u8; 32]).is_err());
        }
    }

    #[test]
    fn random_indices_are_fresh() -> anyhow::Result<()> {
        let field = FiniteField::secp256k1();
        let mut taken = Vec::new();
        for _ in 0..16 {
            let x = field.rand_index(&taken)?;
            assert!(!x.is_zero());
            assert!(x.to_index_bytes().is_ok());
            taken.push(x);
        }
        Ok(())
    }

    #[test]
    #[should_panic]
    fn mixing_fields_is_a_programming_error() {
        let _ = FiniteField::ed25519().one() + FiniteField::secp256k1().one();
    }
}
