//! secp256k1 adapter over `curv`
//!
//! Points are SEC1 compressed (33 bytes); the point at infinity is encoded as the single byte `0x00`.
use crate::algorithms::field::{FieldElement, FiniteField};
use crate::curve::{check_scalar, Curve, CurveKind};
use crate::ecdsa::Signature;
use crate::error::TssError;
use curv::elliptic::curves::{Point, Scalar, Secp256k1};

pub const POINT_LENGTH: usize = 33;
pub const PRIVATE_KEY_LENGTH: usize = 32;
pub const HASH_LENGTH: usize = 32;

const INFINITY: [u8; 1] = [0x00];

#[derive(Clone, Debug)]
pub struct Secp256k1Curve {
    field: FiniteField,
}

impl Secp256k1Curve {
    pub fn new() -> Self {
        Secp256k1Curve {
            field: FiniteField::secp256k1(),
        }
    }

    fn to_scalar(&self, scalar: &FieldElement) -> Scalar<Secp256k1> {
        debug_assert!(scalar.field() == &self.field);
        Scalar::from_bigint(&scalar.to_bigint())
    }

    fn decode_point(&self, bytes: &[u8]) -> Result<Point<Secp256k1>, TssError> {
        if bytes == &INFINITY[..] {
            return Ok(Point::zero());
        }
        if bytes.len() != POINT_LENGTH {
            return Err(TssError::length("secp256k1 point", POINT_LENGTH, bytes.len()));
        }
        Point::from_bytes(bytes).map_err(|_| TssError::InvalidPoint)
    }

    fn encode_point(point: &Point<Secp256k1>) -> Vec<u8> {
        if point.is_zero() {
            INFINITY.to_vec()
        } else {
            point.to_bytes(true).to_vec()
        }
    }

    /// `R.x mod n` of a compressed point, the `r` component of an ECDSA signature
    pub fn x_coordinate(&self, point: &[u8]) -> Result<FieldElement, TssError> {
        if point.len() != POINT_LENGTH {
            return Err(TssError::length("secp256k1 point", POINT_LENGTH, point.len()));
        }
        Ok(self.field.norm(&point[1..]))
    }
}

impl Default for Secp256k1Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl Curve for Secp256k1Curve {
    fn kind(&self) -> CurveKind {
        CurveKind::Secp256k1
    }

    fn scalar_field(&self) -> &FiniteField {
        &self.field
    }

    fn point_length(&self) -> usize {
        POINT_LENGTH
    }

    fn base_mul(&self, scalar: &FieldElement) -> Vec<u8> {
        Self::encode_point(&(Point::generator() * &self.to_scalar(scalar)))
    }

    fn add_point(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>, TssError> {
        let sum = self.decode_point(a)? + self.decode_point(b)?;
        Ok(Self::encode_point(&sum))
    }

    fn mul_scalar(&self, point: &[u8], scalar: &FieldElement) -> Result<Vec<u8>, TssError> {
        check_scalar(self, scalar)?;
        let product = self.decode_point(point)? * &self.to_scalar(scalar);
        Ok(Self::encode_point(&product))
    }

    /// Negation flips the parity prefix of the compressed encoding
    fn neg_point(&self, point: &[u8]) -> Result<Vec<u8>, TssError> {
        self.decode_point(point)?;
        let mut negated = point.to_vec();
        match negated[0] {
            0x02 => negated[0] = 0x03,
            0x03 => negated[0] = 0x02,
            _ => {}
        }
        Ok(negated)
    }

    /// The 32 byte big-endian private key, which must lie in `[1, n)`
    fn derived_key(&self, private_key: &[u8]) -> Result<FieldElement, TssError> {
        if private_key.len() != PRIVATE_KEY_LENGTH {
            return Err(TssError::length(
                "secp256k1 private key",
                PRIVATE_KEY_LENGTH,
                private_key.len(),
            ));
        }
        let d = self.field.decode(private_key)?;
        if d.is_zero() {
            return Err(TssError::InvalidFormat("private key is zero".to_string()));
        }
        Ok(d)
    }

    fn public_key(&self, private_key: &[u8]) -> Result<Vec<u8>, TssError> {
        Ok(self.base_mul(&self.derived_key(private_key)?))
    }

    /// ECDSA over a 32 byte message hash with a random nonce, compact `r || s` with low `s`
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TssError> {
        if message.len() != HASH_LENGTH {
            return Err(TssError::length("message hash", HASH_LENGTH, message.len()));
        }
        let d = self.derived_key(private_key)?;
        let h = self.field.norm(message);
        let k = self.field.rand_nonzero();
        let r = self.x_coordinate(&self.base_mul(&k))?;
        if r.is_zero() {
            return Err(TssError::InvalidFormat(
                "degenerate nonce, sign again".to_string(),
            ));
        }
        let s = k.inv()? * (&h + &(&r * &d));
        Ok(Signature::new(r, s).normalize_s().to_bytes().to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        match Signature::from_bytes(&self.field, signature) {
            Ok(signature) => signature.verify(self, public_key, message),
            Err(_) => false,
        }
    }
}
