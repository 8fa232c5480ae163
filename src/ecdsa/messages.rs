//!   Message types exchanged by the threshold ECDSA rounds
//!
use crate::algorithms::field::{FieldElement, FiniteField, ELEMENT_LENGTH};
use crate::curve::secp256k1::POINT_LENGTH;
use crate::error::TssError;
use crate::protocol::Group;
use crate::sharing::share::decode_partial;
use crate::sharing::{Commitment, Share};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

pub use crate::sharing::KeyDealing;

/// Enumerates messages a signer broadcasts during signing
#[derive(Debug, Clone, Display)]
pub enum Message {
    R1(MaskedKeyShare),
    R2(PartialSignature),
}

// Conversion helpers : unwrap Message variant to one of its inner structs
impl From<Message> for Option<MaskedKeyShare> {
    fn from(m: Message) -> Option<MaskedKeyShare> {
        match m {
            Message::R1(masked) => Some(masked),
            _ => None,
        }
    }
}

impl From<Message> for Option<PartialSignature> {
    fn from(m: Message) -> Option<PartialSignature> {
        match m {
            Message::R2(partial) => Some(partial),
            _ => None,
        }
    }
}

/// A signer's shares of the per-signature secrets $`z = k^{-1}`$, $`b`$ and $`c = zb`$
///
/// The value is consumed by [`EcTss::sign`](crate::ecdsa::EcTss::sign), so one dealing serves one signature.
pub struct EcNonceShare {
    z: Share,
    b: Share,
    c: Share,
}

impl EcNonceShare {
    pub const LENGTH: usize = 3 * Share::LENGTH;

    pub(crate) fn new(z: Share, b: Share, c: Share) -> Result<Self, TssError> {
        if z.index() != b.index() || z.index() != c.index() {
            return Err(TssError::IrrelevantShares);
        }
        if z.group() != b.group() || z.group() != c.group() {
            return Err(TssError::GroupMismatch);
        }
        Ok(EcNonceShare { z, b, c })
    }

    pub fn index(&self) -> &FieldElement {
        self.z.index()
    }

    pub fn group(&self) -> &Group {
        self.z.group()
    }

    pub(crate) fn blind(&self) -> &Share {
        &self.b
    }

    pub(crate) fn into_parts(self) -> (Share, Share) {
        (self.z, self.c)
    }

    /// `z || b || c` share records, for transport to the signer
    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(Self::LENGTH));
        out.extend_from_slice(&self.z.to_bytes());
        out.extend_from_slice(&self.b.to_bytes());
        out.extend_from_slice(&self.c.to_bytes());
        out
    }

    pub fn from_bytes(field: &FiniteField, bytes: &[u8]) -> Result<Self, TssError> {
        if bytes.len() != Self::LENGTH {
            return Err(TssError::length("nonce share", Self::LENGTH, bytes.len()));
        }
        let record =
            |i: usize| Share::from_bytes(field, &bytes[i * Share::LENGTH..(i + 1) * Share::LENGTH]);
        Self::new(record(0)?, record(1)?, record(2)?)
    }
}

impl fmt::Debug for EcNonceShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EcNonceShare {{ index: {}, group: {}, [***] }}",
            self.index(),
            self.group()
        )
    }
}

/// Public part of a randomness dealing: $`R = kG`$ and the commitments to the three sharing polynomials
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcSessionCommitment {
    pub big_r: Vec<u8>,
    pub z: Commitment,
    pub b: Commitment,
    pub c: Commitment,
}

/// Output of the randomness dealer, `nonces[i]` goes to the holder of the i-th evaluation point
#[derive(Debug)]
pub struct EcRandomnessDealing {
    pub nonces: Vec<EcNonceShare>,
    pub session: EcSessionCommitment,
}

/// Round one broadcast $`\delta_i = d_i - b_i`$
#[derive(Clone, PartialEq, Eq)]
pub struct MaskedKeyShare(pub(crate) Share);

impl MaskedKeyShare {
    pub fn share(&self) -> &Share {
        &self.0
    }

    pub fn index(&self) -> &FieldElement {
        self.0.index()
    }

    pub fn value(&self) -> &FieldElement {
        self.0.secret()
    }

    pub fn to_bytes(&self) -> [u8; Share::LENGTH] {
        self.0.to_bytes()
    }

    pub fn from_bytes(field: &FiniteField, bytes: &[u8]) -> Result<Self, TssError> {
        Ok(MaskedKeyShare(Share::from_bytes(field, bytes)?))
    }
}

impl fmt::Debug for MaskedKeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MaskedKeyShare {{ index: {}, group: {}, value: {} }}",
            self.index(),
            self.0.group(),
            self.value()
        )
    }
}

/// Round two broadcast, serialized as `R(33) || e_i(32)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialSignature {
    index: FieldElement,
    group: Group,
    big_r: Vec<u8>,
    e: FieldElement,
}

impl PartialSignature {
    pub const LENGTH: usize = POINT_LENGTH + ELEMENT_LENGTH;

    pub(crate) fn new(index: FieldElement, group: Group, big_r: Vec<u8>, e: FieldElement) -> Self {
        PartialSignature {
            index,
            group,
            big_r,
            e,
        }
    }

    pub fn index(&self) -> &FieldElement {
        &self.index
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn big_r(&self) -> &[u8] {
        &self.big_r
    }

    pub fn e(&self) -> &FieldElement {
        &self.e
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LENGTH);
        out.extend_from_slice(&self.big_r);
        out.extend_from_slice(&self.e.to_bytes());
        out
    }

    /// Parses the wire form; the evaluation point and group of the sender are known from the session.
    pub fn from_bytes(
        field: &FiniteField,
        index: FieldElement,
        group: Group,
        bytes: &[u8],
    ) -> Result<Self, TssError> {
        let (big_r, e) = decode_partial(field, &index, POINT_LENGTH, bytes)?;
        Ok(PartialSignature {
            index,
            group,
            big_r,
            e,
        })
    }
}
