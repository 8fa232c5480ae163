//! Dealing and signing rounds of threshold EdDSA
use crate::algorithms::field::FieldElement;
use crate::algorithms::sha::HSha512;
use crate::curve::ed25519::{Ed25519Curve, POINT_LENGTH, SIGNATURE_LENGTH};
use crate::curve::Curve;
use crate::eddsa::messages::{
    KeyDealing, NonceShare, PartialSignature, RandomnessDealing, SessionCommitment,
};
use crate::error::TssError;
use crate::protocol::{GroupId, Parameters};
use crate::sharing::{Commitment, SecretSharing, Share};

#[derive(Clone, Debug)]
pub struct EdTss {
    curve: Ed25519Curve,
    sharing: SecretSharing,
}

impl EdTss {
    pub fn new() -> Self {
        let curve = Ed25519Curve::new();
        let sharing = SecretSharing::for_curve(&curve);
        EdTss { curve, sharing }
    }

    pub fn curve(&self) -> &Ed25519Curve {
        &self.curve
    }

    pub fn sharing(&self) -> &SecretSharing {
        &self.sharing
    }

    /// Splits the derived key of an ed25519 seed; `public_key` is the key of the seed itself.
    pub fn share_key(
        &self,
        seed: &[u8],
        params: &Parameters,
        indice: &[FieldElement],
    ) -> Result<KeyDealing, TssError> {
        let a = self.curve.derived_key(seed)?;
        let public_key = self.curve.public_key(seed)?;
        let (shares, commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &a, params, indice, None)?;
        log::debug!("key dealt to {} parties {}", shares.len(), params);
        Ok(KeyDealing {
            shares,
            public_key,
            commitment,
        })
    }

    /// Draws a session nonce `r` and shares it; `r` itself is not returned.
    ///
    /// With a `seed` the nonce is `SHA-512(seed)` reduced, and the seed must be unique per message.
    /// Dealers contributing to one session pass the same `id` and the same `indice`.
    pub fn share_randomness(
        &self,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
        seed: Option<&[u8]>,
    ) -> Result<RandomnessDealing, TssError> {
        let field = self.sharing.field();
        let r = match seed {
            Some(seed) => HSha512::create_hash_to_field(field, &[seed]),
            None => field.rand_nonzero(),
        };
        if r.is_zero() {
            return Err(TssError::InvalidFormat(
                "nonce derived from the seed is zero".to_string(),
            ));
        }
        let (shares, commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &r, params, indice, id)?;
        log::debug!("nonce dealt to {} parties {}", shares.len(), params);
        Ok(RandomnessDealing {
            nonces: shares.into_iter().map(NonceShare::new).collect(),
            session: SessionCommitment {
                big_r: self.curve.base_mul(&r),
                commitment,
            },
        })
    }

    /// Public part of the sum of several nonce dealings of one session
    pub fn aggregate_sessions(
        &self,
        sessions: &[SessionCommitment],
    ) -> Result<SessionCommitment, TssError> {
        let (first, rest) = sessions.split_first().ok_or(TssError::InsufficientShares {
            required: 1,
            actual: 0,
        })?;
        rest.iter().try_fold(first.clone(), |acc, session| {
            Ok(SessionCommitment {
                big_r: self.curve.add_point(&acc.big_r, &session.big_r)?,
                commitment: acc.commitment.combine(&self.curve, &session.commitment)?,
            })
        })
    }

    /// Checks a received nonce share against the session commitment
    pub fn verify_nonce(&self, nonce: &NonceShare, session: &SessionCommitment) -> bool {
        let share = nonce.share();
        if session.commitment.constant() != Some(session.big_r.as_slice()) {
            log::warn!("session commitment does not open to its nonce point");
            return false;
        }
        self.sharing
            .verify(&self.curve, share.secret(), share.index(), &session.commitment)
    }

    /// Partial signature $`r_i G \| s_i`$ with $`s_i = r_i + H(R \| A \| M) a_i`$, consuming the nonce share
    pub fn sign(
        &self,
        message: &[u8],
        big_r: &[u8],
        public_key: &[u8],
        nonce: NonceShare,
        key_share: &Share,
    ) -> Result<PartialSignature, TssError> {
        if big_r.len() != POINT_LENGTH {
            return Err(TssError::length("nonce commitment", POINT_LENGTH, big_r.len()));
        }
        if public_key.len() != POINT_LENGTH {
            return Err(TssError::length("public key", POINT_LENGTH, public_key.len()));
        }
        if nonce.index() != key_share.index() {
            return Err(TssError::IrrelevantShares);
        }
        if nonce.group().threshold() != key_share.group().threshold() {
            return Err(TssError::GroupMismatch);
        }
        let nonce = nonce.into_share();
        let h = self.challenge(big_r, public_key, message);
        let s = nonce.secret() + &(&h * key_share.secret());
        Ok(PartialSignature::new(
            nonce.index().clone(),
            *nonce.group(),
            self.curve.base_mul(nonce.secret()),
            s,
        ))
    }

    /// Checks $`r_i G = R(x_i)`$ and $`s_i G = r_i G + h P(x_i)`$
    pub fn verify_partial(
        &self,
        message: &[u8],
        public_key: &[u8],
        session: &SessionCommitment,
        key_commitment: &Commitment,
        partial: &PartialSignature,
    ) -> bool {
        let x = partial.index();
        let expected = session.commitment.evaluate(&self.curve, x).and_then(|nonce_point| {
            if nonce_point != partial.nonce_point() {
                return Ok(None);
            }
            let h = self.challenge(&session.big_r, public_key, message);
            let key_point = key_commitment.evaluate(&self.curve, x)?;
            let expected = self
                .curve
                .add_point(&nonce_point, &self.curve.mul_scalar(&key_point, &h)?)?;
            Ok(Some(expected))
        });
        match expected {
            Ok(Some(expected)) if expected == self.curve.base_mul(partial.s()) => true,
            Ok(Some(_)) => {
                log::warn!("partial signature of {} does not match the key commitment", x);
                false
            }
            Ok(None) => {
                log::warn!("nonce point of {} does not match the session commitment", x);
                false
            }
            Err(e) => {
                log::warn!("partial signature of {} cannot be checked: {}", x, e);
                false
            }
        }
    }

    /// $`\ell_i r_i G \| \ell_i s_i`$
    pub fn weight(
        &self,
        partial: &PartialSignature,
        l: &FieldElement,
    ) -> Result<[u8; SIGNATURE_LENGTH], TssError> {
        let point = self.curve.mul_scalar(partial.nonce_point(), l)?;
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..POINT_LENGTH].copy_from_slice(&point);
        out[POINT_LENGTH..].copy_from_slice(&self.sharing.yl(partial.s(), l).to_bytes());
        Ok(out)
    }

    /// Sums weighted partial signatures, points and scalars separately
    pub fn add_sig(
        &self,
        weighted: &[[u8; SIGNATURE_LENGTH]],
    ) -> Result<[u8; SIGNATURE_LENGTH], TssError> {
        let (first, rest) = weighted.split_first().ok_or(TssError::InsufficientShares {
            required: 1,
            actual: 0,
        })?;
        let field = self.sharing.field();
        let mut big_r = first[..POINT_LENGTH].to_vec();
        let mut s = field.decode(&first[POINT_LENGTH..])?;
        for partial in rest {
            big_r = self.curve.add_point(&big_r, &partial[..POINT_LENGTH])?;
            s = s + &field.decode(&partial[POINT_LENGTH..])?;
        }
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..POINT_LENGTH].copy_from_slice(&big_r);
        out[POINT_LENGTH..].copy_from_slice(&s.to_bytes());
        Ok(out)
    }

    /// Interpolates at least `t` partial signatures of one session into an ed25519 signature
    pub fn combine(
        &self,
        partials: &[PartialSignature],
    ) -> Result<[u8; SIGNATURE_LENGTH], TssError> {
        let basis = self
            .sharing
            .quorum_basis(partials.iter().map(|p| (p.index(), p.group())))?;
        let weighted = partials
            .iter()
            .zip(basis.iter())
            .map(|(p, l)| self.weight(p, l))
            .collect::<Result<Vec<_>, _>>()?;
        let signature = self.add_sig(&weighted)?;
        log::debug!("combined {} partial signatures", partials.len());
        Ok(signature)
    }

    pub fn verify(&self, message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        self.curve.verify(message, signature, public_key)
    }

    /// $`H(R \| A \| M)`$ reduced modulo `l`
    fn challenge(&self, big_r: &[u8], public_key: &[u8], message: &[u8]) -> FieldElement {
        HSha512::create_hash_to_field(self.sharing.field(), &[big_r, public_key, message])
    }
}

impl Default for EdTss {
    fn default() -> Self {
        Self::new()
    }
}
