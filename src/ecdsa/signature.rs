//! Dealing and signing rounds of threshold ECDSA
//!
//! The rounds are pure functions over explicit messages; transport between the dealer and the signers
//! is left to the caller.
use crate::algorithms::field::FieldElement;
use crate::algorithms::sha::HSha512;
use crate::curve::secp256k1::{Secp256k1Curve, HASH_LENGTH};
use crate::curve::Curve;
use crate::ecdsa::messages::{
    EcNonceShare, EcRandomnessDealing, EcSessionCommitment, KeyDealing, MaskedKeyShare,
    PartialSignature,
};
use crate::ecdsa::{recovery_id, Signature};
use crate::error::TssError;
use crate::protocol::{GroupId, Parameters};
use crate::sharing::{Commitment, SecretSharing, Share};

#[derive(Clone, Debug)]
pub struct EcTss {
    curve: Secp256k1Curve,
    sharing: SecretSharing,
}

impl EcTss {
    pub fn new() -> Self {
        let curve = Secp256k1Curve::new();
        let sharing = SecretSharing::for_curve(&curve);
        EcTss { curve, sharing }
    }

    pub fn curve(&self) -> &Secp256k1Curve {
        &self.curve
    }

    pub fn sharing(&self) -> &SecretSharing {
        &self.sharing
    }

    /// Splits a 32 byte private key into `n` shares with a commitment whose constant term is the public key
    pub fn share_key(
        &self,
        private_key: &[u8],
        params: &Parameters,
        indice: &[FieldElement],
    ) -> Result<KeyDealing, TssError> {
        let d = self.curve.derived_key(private_key)?;
        let public_key = self.curve.public_key(private_key)?;
        let (shares, commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &d, params, indice, None)?;
        log::debug!("key dealt to {} parties {}", shares.len(), params);
        Ok(KeyDealing {
            shares,
            public_key,
            commitment,
        })
    }

    /// Draws the nonce `k` of one signature and shares `k^-1`, a random blind `b` and their product.
    ///
    /// With a `seed` the nonce is `SHA-512(seed)` reduced; the seed must then be unique per message.
    /// The nonce itself is not returned. `indice` should be the evaluation points of the key shares.
    pub fn share_randomness(
        &self,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
        seed: Option<&[u8]>,
    ) -> Result<EcRandomnessDealing, TssError> {
        let field = self.sharing.field();
        let k = match seed {
            Some(seed) => HSha512::create_hash_to_field(field, &[seed]),
            None => field.rand_nonzero(),
        };
        if k.is_zero() {
            return Err(TssError::InvalidFormat(
                "nonce derived from the seed is zero".to_string(),
            ));
        }
        let big_r = self.curve.base_mul(&k);
        if self.curve.x_coordinate(&big_r)?.is_zero() {
            return Err(TssError::InvalidFormat(
                "degenerate nonce commitment, draw another nonce".to_string(),
            ));
        }
        let z = k.inv()?;
        let b = field.rand();
        let c = &z * &b;

        let indice = self.sharing.resolve_indice(indice, params.share_count())?;
        let id = Some(id.unwrap_or_else(GroupId::random));
        let (z_shares, z_commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &z, params, &indice, id)?;
        let (b_shares, b_commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &b, params, &indice, id)?;
        let (c_shares, c_commitment) =
            self.sharing
                .share_with_commitment(&self.curve, &c, params, &indice, id)?;

        let nonces = z_shares
            .into_iter()
            .zip(b_shares.into_iter())
            .zip(c_shares.into_iter())
            .map(|((z, b), c)| EcNonceShare::new(z, b, c))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("randomness dealt to {} parties {}", nonces.len(), params);

        Ok(EcRandomnessDealing {
            nonces,
            session: EcSessionCommitment {
                big_r,
                z: z_commitment,
                b: b_commitment,
                c: c_commitment,
            },
        })
    }

    /// Round one: $`\delta_i = d_i - b_i`$
    pub fn mask(&self, nonce: &EcNonceShare, key_share: &Share) -> Result<MaskedKeyShare, TssError> {
        if nonce.index() != key_share.index() {
            return Err(TssError::IrrelevantShares);
        }
        if nonce.group().threshold() != key_share.group().threshold() {
            return Err(TssError::GroupMismatch);
        }
        let blind = nonce.blind();
        let delta = key_share.secret() - blind.secret();
        Ok(MaskedKeyShare(blind.with_secret(delta)?))
    }

    /// Checks $`\delta_i G = P(x_i) - B(x_i)`$ against the key and blind commitments
    pub fn verify_mask(
        &self,
        masked: &MaskedKeyShare,
        key_commitment: &Commitment,
        session: &EcSessionCommitment,
    ) -> bool {
        let x = masked.index();
        let expected = key_commitment
            .evaluate(&self.curve, x)
            .and_then(|p| {
                let minus_b = self.curve.neg_point(&session.b.evaluate(&self.curve, x)?)?;
                self.curve.add_point(&p, &minus_b)
            });
        match expected {
            Ok(expected) if expected == self.curve.base_mul(masked.value()) => true,
            Ok(_) => {
                log::warn!("masked key share of {} does not match the commitments", x);
                false
            }
            Err(e) => {
                log::warn!("masked key share of {} cannot be checked: {}", x, e);
                false
            }
        }
    }

    /// Opens $`\delta = d - b`$ from at least `t` masked shares
    pub fn open_mask(&self, masked: &[MaskedKeyShare]) -> Result<FieldElement, TssError> {
        let shares = masked.iter().map(|m| m.0.clone()).collect::<Vec<_>>();
        self.sharing.construct(&shares)
    }

    /// Round two: $`e_i = z_i (h + r\delta) + r c_i`$, consuming the nonce share
    pub fn sign(
        &self,
        message_hash: &[u8],
        big_r: &[u8],
        delta: &FieldElement,
        nonce: EcNonceShare,
    ) -> Result<PartialSignature, TssError> {
        if message_hash.len() != HASH_LENGTH {
            return Err(TssError::length("message hash", HASH_LENGTH, message_hash.len()));
        }
        if delta.field() != self.sharing.field() {
            return Err(TssError::FieldMismatch);
        }
        let r = self.curve.x_coordinate(big_r)?;
        let h = self.sharing.field().norm(message_hash);
        let (z, c) = nonce.into_parts();

        let e = z.secret() * &(&h + &(&r * delta)) + &(&r * c.secret());
        Ok(PartialSignature::new(
            z.index().clone(),
            *z.group(),
            big_r.to_vec(),
            e,
        ))
    }

    /// Checks $`e_i G = (h + r\delta) Z(x_i) + r C(x_i)`$
    pub fn verify_partial(
        &self,
        message_hash: &[u8],
        session: &EcSessionCommitment,
        delta: &FieldElement,
        partial: &PartialSignature,
    ) -> bool {
        if partial.big_r() != session.big_r.as_slice() {
            log::warn!("partial signature of {} is bound to another nonce", partial.index());
            return false;
        }
        if message_hash.len() != HASH_LENGTH {
            return false;
        }
        let x = partial.index();
        let expected = self.curve.x_coordinate(&session.big_r).and_then(|r| {
            let h = self.sharing.field().norm(message_hash);
            let factor = &h + &(&r * delta);
            let z_term = self
                .curve
                .mul_scalar(&session.z.evaluate(&self.curve, x)?, &factor)?;
            let c_term = self
                .curve
                .mul_scalar(&session.c.evaluate(&self.curve, x)?, &r)?;
            self.curve.add_point(&z_term, &c_term)
        });
        match expected {
            Ok(expected) if expected == self.curve.base_mul(partial.e()) => true,
            Ok(_) => {
                log::warn!("partial signature of {} does not match the commitments", x);
                false
            }
            Err(e) => {
                log::warn!("partial signature of {} cannot be checked: {}", x, e);
                false
            }
        }
    }

    /// A partial signature weighted by the Lagrange coefficient of its signer
    pub fn weight(&self, partial: &PartialSignature, l: &FieldElement) -> FieldElement {
        self.sharing.yl(partial.e(), l)
    }

    /// Sums weighted partial signatures into a low-S signature and its recovery bit
    pub fn add_sig(
        &self,
        weighted: &[FieldElement],
        big_r: &[u8],
    ) -> Result<(Signature, u8), TssError> {
        let field = self.sharing.field();
        let s = weighted.iter().fold(field.zero(), |sum, e| sum + e);
        let r = self.curve.x_coordinate(big_r)?;
        if r.is_zero() || s.is_zero() {
            return Err(TssError::InvalidFormat(
                "degenerate signature".to_string(),
            ));
        }
        let mut recovery = recovery_id(big_r, &r)?;
        let signature = Signature::new(r, s);
        if signature.is_high_s() {
            recovery ^= 1;
        }
        Ok((signature.normalize_s(), recovery))
    }

    /// Interpolates at least `t` partial signatures of one session
    pub fn combine(&self, partials: &[PartialSignature]) -> Result<(Signature, u8), TssError> {
        let basis = self
            .sharing
            .quorum_basis(partials.iter().map(|p| (p.index(), p.group())))?;
        let big_r = partials[0].big_r();
        if partials.iter().any(|p| p.big_r() != big_r) {
            return Err(TssError::GroupMismatch);
        }
        let weighted = partials
            .iter()
            .zip(basis.iter())
            .map(|(p, l)| self.weight(p, l))
            .collect::<Vec<_>>();
        let result = self.add_sig(&weighted, big_r)?;
        log::debug!("combined {} partial signatures", partials.len());
        Ok(result)
    }

    /// Plain ECDSA verification of a compact signature over a 32 byte hash
    pub fn verify(&self, message_hash: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        self.curve.verify(message_hash, signature, public_key)
    }
}

impl Default for EcTss {
    fn default() -> Self {
        Self::new()
    }
}
