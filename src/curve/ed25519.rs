//! ed25519 adapter over `curve25519-dalek` and `ed25519-dalek`
use crate::algorithms::field::{FieldElement, FiniteField};
use crate::algorithms::sha::HSha512;
use crate::curve::{check_scalar, Curve, CurveKind};
use crate::error::TssError;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::convert::TryInto;
use zeroize::Zeroizing;

pub const POINT_LENGTH: usize = 32;
pub const SEED_LENGTH: usize = 32;
pub const SIGNATURE_LENGTH: usize = 64;

#[derive(Clone, Debug)]
pub struct Ed25519Curve {
    field: FiniteField,
}

impl Ed25519Curve {
    pub fn new() -> Self {
        Ed25519Curve {
            field: FiniteField::ed25519(),
        }
    }

    fn to_scalar(&self, scalar: &FieldElement) -> Scalar {
        debug_assert!(scalar.field() == &self.field);
        Scalar::from_bytes_mod_order(scalar.to_bytes())
    }

    fn decode_point(&self, bytes: &[u8]) -> Result<EdwardsPoint, TssError> {
        let compressed: [u8; POINT_LENGTH] = bytes
            .try_into()
            .map_err(|_| TssError::length("ed25519 point", POINT_LENGTH, bytes.len()))?;
        CompressedEdwardsY(compressed)
            .decompress()
            .ok_or(TssError::InvalidPoint)
    }

    fn encode_point(point: &EdwardsPoint) -> Vec<u8> {
        point.compress().to_bytes().to_vec()
    }

    /// Accepts a 32 byte seed or a 64 byte `seed || public key` keypair
    fn signing_key(private_key: &[u8]) -> Result<SigningKey, TssError> {
        match private_key.len() {
            32 | 64 => {
                let mut seed = Zeroizing::new([0u8; SEED_LENGTH]);
                seed.copy_from_slice(&private_key[..SEED_LENGTH]);
                Ok(SigningKey::from_bytes(&seed))
            }
            len => Err(TssError::length("ed25519 private key", SEED_LENGTH, len)),
        }
    }
}

impl Default for Ed25519Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl Curve for Ed25519Curve {
    fn kind(&self) -> CurveKind {
        CurveKind::Ed25519
    }

    fn scalar_field(&self) -> &FiniteField {
        &self.field
    }

    fn point_length(&self) -> usize {
        POINT_LENGTH
    }

    fn base_mul(&self, scalar: &FieldElement) -> Vec<u8> {
        Self::encode_point(&EdwardsPoint::mul_base(&self.to_scalar(scalar)))
    }

    fn add_point(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>, TssError> {
        let sum = self.decode_point(a)? + self.decode_point(b)?;
        Ok(Self::encode_point(&sum))
    }

    fn mul_scalar(&self, point: &[u8], scalar: &FieldElement) -> Result<Vec<u8>, TssError> {
        check_scalar(self, scalar)?;
        let product = self.decode_point(point)? * self.to_scalar(scalar);
        Ok(Self::encode_point(&product))
    }

    fn neg_point(&self, point: &[u8]) -> Result<Vec<u8>, TssError> {
        Ok(Self::encode_point(&-self.decode_point(point)?))
    }

    /// `clamp(SHA-512(seed)[..32])` reduced modulo `l`
    fn derived_key(&self, private_key: &[u8]) -> Result<FieldElement, TssError> {
        if private_key.len() != SEED_LENGTH && private_key.len() != 2 * SEED_LENGTH {
            return Err(TssError::length(
                "ed25519 private key",
                SEED_LENGTH,
                private_key.len(),
            ));
        }
        let digest = Zeroizing::new(HSha512::create_hash_from_slices(&[
            &private_key[..SEED_LENGTH],
        ]));
        let mut scalar = Zeroizing::new([0u8; 32]);
        scalar.copy_from_slice(&digest[..32]);
        scalar[0] &= 248;
        scalar[31] &= 127;
        scalar[31] |= 64;
        Ok(self.field.norm(&scalar[..]))
    }

    fn public_key(&self, private_key: &[u8]) -> Result<Vec<u8>, TssError> {
        Ok(Self::signing_key(private_key)?
            .verifying_key()
            .to_bytes()
            .to_vec())
    }

    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TssError> {
        Ok(Self::signing_key(private_key)?
            .sign(message)
            .to_bytes()
            .to_vec())
    }

    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let signature: [u8; SIGNATURE_LENGTH] = match signature.try_into() {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        let public_key: [u8; POINT_LENGTH] = match public_key.try_into() {
            Ok(public_key) => public_key,
            Err(_) => return false,
        };
        match VerifyingKey::from_bytes(&public_key) {
            Ok(key) => key
                .verify(message, &Signature::from_bytes(&signature))
                .is_ok(),
            Err(_) => false,
        }
    }
}
