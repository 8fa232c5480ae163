//! Message types exchanged by the threshold EdDSA rounds
use crate::algorithms::field::{FieldElement, FiniteField, ELEMENT_LENGTH};
use crate::curve::ed25519::POINT_LENGTH;
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
    R1(SessionCommitment),
    R2(PartialSignature),
}

impl From<Message> for Option<SessionCommitment> {
    fn from(m: Message) -> Option<SessionCommitment> {
        match m {
            Message::R1(session) => Some(session),
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

/// A signer's share of the session nonce `r`
///
/// Not `Clone`: [`EdTss::sign`](crate::eddsa::EdTss::sign) takes it by value, so a share signs
/// exactly one message unless it is explicitly exported and imported again.
///
/// ```compile_fail
/// use threshold_primitives::eddsa::EdTss;
/// use threshold_primitives::protocol::Parameters;
///
/// let tss = EdTss::new();
/// let params = Parameters::new(1, 1).unwrap();
/// let key = tss.share_key(&[1u8; 32], &params, &[]).unwrap();
/// let indice = vec![key.shares[0].index().clone()];
/// let mut dealing = tss.share_randomness(&params, &indice, None, None).unwrap();
/// let nonce = dealing.nonces.remove(0);
/// let big_r = &dealing.session.big_r;
///
/// tss.sign(b"first", big_r, &key.public_key, nonce, &key.shares[0]).unwrap();
/// tss.sign(b"second", big_r, &key.public_key, nonce, &key.shares[0]).unwrap();
/// ```
pub struct NonceShare {
    share: Share,
}

impl NonceShare {
    pub const LENGTH: usize = Share::LENGTH;

    pub(crate) fn new(share: Share) -> Self {
        NonceShare { share }
    }

    pub fn index(&self) -> &FieldElement {
        self.share.index()
    }

    pub fn group(&self) -> &Group {
        self.share.group()
    }

    pub(crate) fn share(&self) -> &Share {
        &self.share
    }

    pub(crate) fn into_share(self) -> Share {
        self.share
    }

    /// Sums the shares a signer received from several nonce dealers of one session
    pub fn aggregate(self, other: NonceShare) -> Result<NonceShare, TssError> {
        if self.index() != other.index() {
            return Err(TssError::IrrelevantShares);
        }
        if self.group() != other.group() {
            return Err(TssError::GroupMismatch);
        }
        let secret = self.share.secret() + other.share.secret();
        Ok(NonceShare::new(self.share.with_secret(secret)?))
    }

    /// Share record for transport to the signer
    pub fn into_bytes(self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.share.to_bytes().to_vec())
    }

    pub fn from_bytes(field: &FiniteField, bytes: &[u8]) -> Result<Self, TssError> {
        Ok(NonceShare::new(Share::from_bytes(field, bytes)?))
    }
}

impl fmt::Debug for NonceShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NonceShare {{ index: {}, group: {}, [***] }}",
            self.index(),
            self.group()
        )
    }
}

/// Public part of a nonce dealing: $`R = rG`$ and the commitment to the sharing polynomial of `r`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCommitment {
    pub big_r: Vec<u8>,
    pub commitment: Commitment,
}

/// Output of a nonce dealer, `nonces[i]` goes to the holder of the i-th evaluation point
#[derive(Debug)]
pub struct RandomnessDealing {
    pub nonces: Vec<NonceShare>,
    pub session: SessionCommitment,
}

/// Partial signature `rG_i || s_i` of one signer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialSignature {
    index: FieldElement,
    group: Group,
    nonce_point: Vec<u8>,
    s: FieldElement,
}

impl PartialSignature {
    pub const LENGTH: usize = POINT_LENGTH + ELEMENT_LENGTH;

    pub(crate) fn new(
        index: FieldElement,
        group: Group,
        nonce_point: Vec<u8>,
        s: FieldElement,
    ) -> Self {
        PartialSignature {
            index,
            group,
            nonce_point,
            s,
        }
    }

    pub fn index(&self) -> &FieldElement {
        &self.index
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// $`r_i G`$
    pub fn nonce_point(&self) -> &[u8] {
        &self.nonce_point
    }

    pub fn s(&self) -> &FieldElement {
        &self.s
    }

    pub fn to_bytes(&self) -> [u8; PartialSignature::LENGTH] {
        let mut out = [0u8; PartialSignature::LENGTH];
        out[..POINT_LENGTH].copy_from_slice(&self.nonce_point);
        out[POINT_LENGTH..].copy_from_slice(&self.s.to_bytes());
        out
    }

    /// Parses the wire form; the evaluation point and group of the sender are known from the session.
    pub fn from_bytes(
        field: &FiniteField,
        index: FieldElement,
        group: Group,
        bytes: &[u8],
    ) -> Result<Self, TssError> {
        let (nonce_point, s) = decode_partial(field, &index, POINT_LENGTH, bytes)?;
        Ok(PartialSignature {
            index,
            group,
            nonce_point,
            s,
        })
    }
}
