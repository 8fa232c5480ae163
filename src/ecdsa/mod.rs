//!  Threshold ECDSA over secp256k1
//!
//!  A dealer splits the private key $`d`$ into `t`-of-`n` shares. For every signature a dealer of
//!  randomness draws the nonce $`k`$, publishes $`R = k \cdot G`$ and shares
//!
//! ```text
//!     z = k^-1,   b (random blind),   c = z * b
//! ```
//!
//!  over the same evaluation points. The signing quorum runs two rounds:
//!
//! 1. each signer publishes the masked key share $`\delta_i = d_i - b_i`$; any `t` of them open
//!    $`\delta = d - b`$, which carries no information about $`d`$
//! 2. each signer publishes $`e_i = z_i (h + r\delta) + r c_i`$
//!
//!  Since $`z\delta + c = zd`$, Lagrange interpolation of the $`e_i`$ yields
//!  $`s = k^{-1}(h + rd)`$, an ordinary ECDSA signature which is normalized to low `s`
//!  and accompanied by the recovery bit.
//!
//!  Every published value is checked against the Feldman commitments of the dealings before it is used.
//!  The randomness dealer learns $`k`$ and must be trusted in the same way as the key dealer.
use crate::algorithms::field::{FieldElement, FiniteField, ELEMENT_LENGTH};
use crate::algorithms::sha::HSha256;
use crate::curve::secp256k1::{Secp256k1Curve, HASH_LENGTH, POINT_LENGTH};
use crate::curve::Curve;
use crate::error::TssError;
use curv::arithmetic::traits::Converter;
use curv::BigInt;
use std::fmt;

pub mod messages;
pub mod signature;

pub use messages::{
    EcNonceShare, EcRandomnessDealing, EcSessionCommitment, KeyDealing, MaskedKeyShare, Message,
    PartialSignature,
};
pub use signature::EcTss;

/// SHA-256 digest of a message, the form in which messages enter ECDSA
pub fn message_hash(message: &[u8]) -> [u8; HASH_LENGTH] {
    HSha256::create_hash_from_slices(&[message])
}

/// ECDSA signature, serialized in the compact form `r || s`, both big-endian
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: FieldElement,
    pub s: FieldElement,
}

impl Signature {
    pub const LENGTH: usize = 2 * ELEMENT_LENGTH;

    pub fn new(r: FieldElement, s: FieldElement) -> Self {
        Signature { r, s }
    }

    pub fn from_bytes(field: &FiniteField, bytes: &[u8]) -> Result<Self, TssError> {
        if bytes.len() != Self::LENGTH {
            return Err(TssError::length("signature", Self::LENGTH, bytes.len()));
        }
        Ok(Signature {
            r: field.decode(&bytes[..ELEMENT_LENGTH])?,
            s: field.decode(&bytes[ELEMENT_LENGTH..])?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Signature::LENGTH] {
        let mut out = [0u8; Signature::LENGTH];
        out[..ELEMENT_LENGTH].copy_from_slice(&self.r.to_bytes());
        out[ELEMENT_LENGTH..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// `s > n / 2`
    pub fn is_high_s(&self) -> bool {
        let half = self.s.field().modulus() / &BigInt::from(2u32);
        self.s.to_bigint() > half
    }

    /// Replaces `s` by `n - s` when `s` is in the upper half
    pub fn normalize_s(self) -> Self {
        if self.is_high_s() {
            Signature {
                s: -&self.s,
                r: self.r,
            }
        } else {
            self
        }
    }

    /// verifies the signature using public key and the hash of the message
    pub fn verify(&self, curve: &Secp256k1Curve, public_key: &[u8], message_hash: &[u8]) -> bool {
        if message_hash.len() != HASH_LENGTH
            || public_key.len() != POINT_LENGTH
            || self.r.field() != curve.scalar_field()
            || self.r.is_zero()
            || self.s.is_zero()
        {
            return false;
        }
        let s_invert = match self.s.inv() {
            Ok(s_invert) => s_invert,
            Err(_) => return false,
        };
        let u1 = &curve.scalar_field().norm(message_hash) * &s_invert;
        let u2 = &self.r * &s_invert;

        curve
            .mul_scalar(public_key, &u2)
            .and_then(|point| curve.add_point(&curve.base_mul(&u1), &point))
            .and_then(|point| curve.x_coordinate(&point))
            .map(|x| x == self.r)
            .unwrap_or(false)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature {{ r: {}, s: {} }}", self.r, self.s)
    }
}

/// Recovery bit of a signature before low-S normalization:
/// bit 1 is set when `R.x` exceeds the group order, bit 0 is the parity of `R.y`.
pub(crate) fn recovery_id(big_r: &[u8], r: &FieldElement) -> Result<u8, TssError> {
    if big_r.len() != POINT_LENGTH {
        return Err(TssError::length("nonce commitment", POINT_LENGTH, big_r.len()));
    }
    let x = BigInt::from_bytes(&big_r[1..]);
    let overflow = if x == r.to_bigint() { 0 } else { 2 };
    Ok(overflow | (big_r[0] & 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_encoding() -> anyhow::Result<()> {
        let field = FiniteField::secp256k1();
        let signature = Signature::new(field.from_u64(1), field.from_u64(2));
        let bytes = signature.to_bytes();
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert_eq!(Signature::from_bytes(&field, &bytes)?, signature);
        assert!(Signature::from_bytes(&field, &bytes[1..]).is_err());
        assert!(Signature::from_bytes(&field, &[0xff; 64]).is_err());
        Ok(())
    }

    #[test]
    fn low_s() {
        let field = FiniteField::secp256k1();
        let low = Signature::new(field.one(), field.from_u64(5));
        assert!(!low.is_high_s());
        assert_eq!(low.clone().normalize_s(), low);

        let high = Signature::new(field.one(), -&field.from_u64(5));
        assert!(high.is_high_s());
        assert_eq!(high.normalize_s(), low);
    }

    #[test]
    fn rejects_malformed_inputs() -> anyhow::Result<()> {
        let curve = Secp256k1Curve::new();
        let field = curve.scalar_field().clone();
        let private_key = [3u8; 32];
        let public_key = curve.public_key(&private_key)?;
        let hash = message_hash(b"message");
        let signature = Signature::from_bytes(&field, &curve.sign(&hash, &private_key)?)?;

        assert!(signature.verify(&curve, &public_key, &hash));
        assert!(!signature.verify(&curve, &public_key, &hash[1..]));
        assert!(!signature.verify(&curve, &public_key[1..], &hash));
        let zero_r = Signature::new(field.zero(), signature.s.clone());
        assert!(!zero_r.verify(&curve, &public_key, &hash));
        let zero_s = Signature::new(signature.r.clone(), field.zero());
        assert!(!zero_s.verify(&curve, &public_key, &hash));
        Ok(())
    }
}
