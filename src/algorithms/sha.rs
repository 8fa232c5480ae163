//! SHA-512 and SHA-256 wrappers mapping byte strings onto a scalar field
use crate::algorithms::field::{FieldElement, FiniteField};
use sha2::{Digest, Sha256, Sha512};

pub struct HSha512;

impl HSha512 {
    pub const DIGEST_BYTE_LENGTH: usize = 64;

    /// Digest of the concatenation of `slices`
    pub fn create_hash_from_slices(slices: &[&[u8]]) -> [u8; 64] {
        let mut hasher = Sha512::new();
        for slice in slices {
            hasher.update(slice);
        }
        let mut out = [0u8; 64];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    /// Digest of the concatenation of `slices` read in the byte order of the field and reduced.
    ///
    /// For the ed25519 field this is the challenge $` H(R \Vert A \Vert M) `$ of RFC 8032.
    pub fn create_hash_to_field(field: &FiniteField, slices: &[&[u8]]) -> FieldElement {
        field.norm(&Self::create_hash_from_slices(slices))
    }
}

pub struct HSha256;

impl HSha256 {
    pub const DIGEST_BYTE_LENGTH: usize = 32;

    pub fn create_hash_from_slices(slices: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for slice in slices {
            hasher.update(slice);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}
