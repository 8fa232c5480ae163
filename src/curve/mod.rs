//! Elliptic curve capability consumed by the threshold protocols
//!
//! The protocols never see a point type: scalars are [`FieldElement`]s of the curve's scalar field and
//! points are their canonical byte encodings, 32 bytes (compressed Edwards y) for ed25519 and
//! 33 bytes (SEC1 compressed) for secp256k1.
//! Point arithmetic and single-party signatures are delegated to `curve25519-dalek` / `ed25519-dalek`
//! and to `curv` respectively.
use crate::algorithms::field::{FieldElement, FiniteField};
use crate::error::TssError;
use serde::{Deserialize, Serialize};

pub mod ed25519;
pub mod secp256k1;

pub use ed25519::Ed25519Curve;
pub use secp256k1::Secp256k1Curve;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum CurveKind {
    Ed25519,
    Secp256k1,
}

pub trait Curve: Send + Sync {
    fn kind(&self) -> CurveKind;

    /// Field of scalars, i.e. integers modulo the order of the base point
    fn scalar_field(&self) -> &FiniteField;

    /// Length of an encoded point
    fn point_length(&self) -> usize;

    fn base_mul(&self, scalar: &FieldElement) -> Vec<u8>;

    fn add_point(&self, a: &[u8], b: &[u8]) -> Result<Vec<u8>, TssError>;

    fn mul_scalar(&self, point: &[u8], scalar: &FieldElement) -> Result<Vec<u8>, TssError>;

    fn neg_point(&self, point: &[u8]) -> Result<Vec<u8>, TssError>;

    /// Scalar actually used in curve arithmetic for a raw private key
    fn derived_key(&self, private_key: &[u8]) -> Result<FieldElement, TssError>;

    fn public_key(&self, private_key: &[u8]) -> Result<Vec<u8>, TssError>;

    /// Single-party signature
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TssError>;

    /// Single-party verification, which threshold signatures must pass as well
    fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

pub(crate) fn check_scalar<C: Curve + ?Sized>(
    curve: &C,
    scalar: &FieldElement,
) -> Result<(), TssError> {
    if scalar.field() == curve.scalar_field() {
        Ok(())
    } else {
        Err(TssError::FieldMismatch)
    }
}
