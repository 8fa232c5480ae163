//! Shamir secret sharing over a scalar field
//!
//! A secret $`s`$ is the constant term of a random polynomial $`f`$ of order `t` (degree `t - 1`);
//! party `i` receives $`f(x_i)`$ where $`x_i`$ is a non-zero 8 byte evaluation point.
//! Any `t` shares of the same group recover $`f`$ at any point by Lagrange interpolation
//!
//! $$ f(x) = \sum_i y_i \ell_i(x), \qquad \ell_i(x) = \prod_{j \ne i} \frac{x_j - x}{x_j - x_i} $$
//!
//! Verifiable sharing additionally publishes a [`Commitment`] to the coefficients.
//! Shares are refreshed by adding a sharing of zero ([`SecretSharing::proactivate`], [`SecretSharing::merge`]),
//! which also allows to move the secret to a group with a different threshold or membership.
use crate::algorithms::field::{FieldElement, FiniteField};
use crate::algorithms::polynomial::Polynomial;
use crate::curve::Curve;
use crate::error::TssError;
use crate::protocol::{Group, GroupId, Parameters};
use std::collections::HashSet;
use std::convert::TryFrom;

pub mod commitment;
pub mod share;

pub use commitment::Commitment;
pub use share::Share;

/// Private key split by a dealer
///
/// `commitment.constant()` equals `public_key`, which lets every holder check its share against the key.
#[derive(Clone, Debug)]
pub struct KeyDealing {
    pub shares: Vec<Share>,
    pub public_key: Vec<u8>,
    pub commitment: Commitment,
}

#[derive(Clone, Debug)]
pub struct SecretSharing {
    field: FiniteField,
}

impl SecretSharing {
    pub fn new(field: FiniteField) -> Self {
        SecretSharing { field }
    }

    pub fn for_curve<C: Curve + ?Sized>(curve: &C) -> Self {
        Self::new(curve.scalar_field().clone())
    }

    pub fn field(&self) -> &FiniteField {
        &self.field
    }

    /// Splits `secret` into `n` shares, any `t` of which recover it.
    ///
    /// Explicit evaluation points in `indice` are used first and padded with random ones up to `n`;
    /// a random group id is drawn unless `id` is given.
    pub fn share(
        &self,
        secret: &FieldElement,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
    ) -> Result<Vec<Share>, TssError> {
        self.deal(secret, params, indice, id)
            .map(|(_, shares)| shares)
    }

    /// Same as [`share`](Self::share), also returning the commitment to the polynomial
    pub fn share_with_commitment<C: Curve + ?Sized>(
        &self,
        curve: &C,
        secret: &FieldElement,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
    ) -> Result<(Vec<Share>, Commitment), TssError> {
        if curve.scalar_field() != &self.field {
            return Err(TssError::FieldMismatch);
        }
        let (polynomial, shares) = self.deal(secret, params, indice, id)?;
        Ok((shares, Commitment::from_polynomial(curve, &polynomial)))
    }

    fn deal(
        &self,
        secret: &FieldElement,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
    ) -> Result<(Polynomial, Vec<Share>), TssError> {
        if secret.field() != &self.field {
            return Err(TssError::FieldMismatch);
        }
        let indice = self.resolve_indice(indice, params.share_count())?;
        let group = Group::new(*params, id.unwrap_or_else(GroupId::random));
        let order = usize::try_from(params.threshold()).map_err(|_| {
            TssError::InvalidFormat(format!("threshold {} is too large", params.threshold()))
        })?;
        let polynomial = Polynomial::with_constant(secret.clone(), order)?;

        let shares = indice
            .into_iter()
            .map(|x| {
                let y = polynomial.evaluate(&x);
                Share::new(x, group, y)
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("dealt {} shares in group {}", shares.len(), group);
        Ok((polynomial, shares))
    }

    /// Validates explicit evaluation points and pads them with fresh random points up to `share_count`
    pub fn resolve_indice(
        &self,
        indice: &[FieldElement],
        share_count: u64,
    ) -> Result<Vec<FieldElement>, TssError> {
        if indice.len() as u64 > share_count {
            return Err(TssError::InvalidFormat(format!(
                "{} evaluation points given for {} shares",
                indice.len(),
                share_count
            )));
        }
        let mut seen = HashSet::with_capacity(indice.len());
        for x in indice {
            if x.field() != &self.field {
                return Err(TssError::FieldMismatch);
            }
            if x.is_zero() {
                return Err(TssError::InvalidFormat(
                    "evaluation point must not be zero".to_string(),
                ));
            }
            if !seen.insert(x.to_index_bytes()?) {
                return Err(TssError::InvalidFormat(format!(
                    "evaluation point {} is used twice",
                    x
                )));
            }
        }

        let mut resolved = indice.to_vec();
        while (resolved.len() as u64) < share_count {
            let x = self.field.rand_index(&resolved)?;
            resolved.push(x);
        }
        Ok(resolved)
    }

    /// Lagrange basis $`\ell_i(at)`$ for the points `indice`
    ///
    /// When `at` is one of the points the result is the indicator vector of that point.
    pub fn pi(
        &self,
        indice: &[FieldElement],
        at: &FieldElement,
    ) -> Result<Vec<FieldElement>, TssError> {
        if at.field() != &self.field || indice.iter().any(|x| x.field() != &self.field) {
            return Err(TssError::FieldMismatch);
        }
        if let Some(k) = indice.iter().position(|x| x == at) {
            return Ok((0..indice.len())
                .map(|i| {
                    if i == k {
                        self.field.one()
                    } else {
                        self.field.zero()
                    }
                })
                .collect());
        }

        indice
            .iter()
            .enumerate()
            .map(|(i, x_i)| {
                let fold_with_one = |op: &dyn Fn(FieldElement, &FieldElement) -> FieldElement| {
                    indice
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .fold(self.field.one(), |acc, (_, x_j)| op(acc, x_j))
                };
                let num_fun = |acc: FieldElement, x_j: &FieldElement| acc * &(x_j - at);
                let denom_fun = |acc: FieldElement, x_j: &FieldElement| acc * &(x_j - x_i);

                fold_with_one(&num_fun).div(&fold_with_one(&denom_fun))
            })
            .collect()
    }

    /// A share value weighted by its Lagrange coefficient
    pub fn yl(&self, y: &FieldElement, l: &FieldElement) -> FieldElement {
        y * l
    }

    /// Value of the shared polynomial at `at`
    pub fn interpolate(&self, at: &FieldElement, shares: &[Share]) -> Result<FieldElement, TssError> {
        self.validate(shares)?;
        let indice = shares
            .iter()
            .map(|share| share.index().clone())
            .collect::<Vec<_>>();
        let basis = self.pi(&indice, at)?;
        Ok(shares
            .iter()
            .zip(basis.iter())
            .fold(self.field.zero(), |sum, (share, l)| {
                sum + self.yl(share.secret(), l)
            }))
    }

    /// Recovers the secret, i.e. the value at zero
    pub fn construct(&self, shares: &[Share]) -> Result<FieldElement, TssError> {
        self.interpolate(&self.field.zero(), shares)
    }

    /// Leading coefficient $`a_{t-1}`$ of the shared polynomial, computed from the first `t` shares as
    /// $` \sum_i y_i / \prod_{j \ne i} (x_i - x_j) `$
    pub fn ft1(&self, shares: &[Share]) -> Result<FieldElement, TssError> {
        let group = self.validate(shares)?;
        let quorum = &shares[..group.threshold() as usize];
        quorum
            .iter()
            .enumerate()
            .try_fold(self.field.zero(), |sum, (i, share_i)| {
                let denominator = quorum
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .fold(self.field.one(), |acc, (_, share_j)| {
                        acc * &(share_i.index() - share_j.index())
                    });
                Ok(sum + share_i.secret().div(&denominator)?)
            })
    }

    /// Sharing of zero at the given points, to be merged into existing shares
    pub fn proactivate(
        &self,
        params: &Parameters,
        indice: &[FieldElement],
        id: Option<GroupId>,
    ) -> Result<Vec<Share>, TssError> {
        self.share(&self.field.zero(), params, indice, id)
    }

    /// Adds an update to a share; the result belongs to the group of the update.
    pub fn merge(&self, prev: &Share, next: &Share) -> Result<Share, TssError> {
        if prev.index() != next.index() {
            return Err(TssError::IrrelevantShares);
        }
        Share::new(
            prev.index().clone(),
            *next.group(),
            prev.secret() + next.secret(),
        )
    }

    /// Checks `value * G` against the commitment evaluated at `index`
    pub fn verify<C: Curve + ?Sized>(
        &self,
        curve: &C,
        value: &FieldElement,
        index: &FieldElement,
        commitment: &Commitment,
    ) -> bool {
        match commitment.evaluate(curve, index) {
            Ok(expected) => {
                let valid = curve.base_mul(value) == expected;
                if !valid {
                    log::warn!("value at index {} does not match the commitment", index);
                }
                valid
            }
            Err(e) => {
                log::warn!("commitment cannot be evaluated: {}", e);
                false
            }
        }
    }

    /// Lagrange coefficients at zero for the members of a signing quorum, given as evaluation point
    /// and group of each member
    pub fn quorum_basis<'a, I>(&self, members: I) -> Result<Vec<FieldElement>, TssError>
    where
        I: IntoIterator<Item = (&'a FieldElement, &'a Group)>,
    {
        let (_, indice) = self.check_quorum(members)?;
        self.pi(&indice, &self.field.zero())
    }

    fn validate(&self, shares: &[Share]) -> Result<Group, TssError> {
        self.check_quorum(shares.iter().map(|share| (share.index(), share.group())))
            .map(|(group, _)| group)
    }

    /// All members belong to one group of this field, hold distinct points and reach the threshold
    fn check_quorum<'a, I>(&self, members: I) -> Result<(Group, Vec<FieldElement>), TssError>
    where
        I: IntoIterator<Item = (&'a FieldElement, &'a Group)>,
    {
        let members = members.into_iter().collect::<Vec<_>>();
        let group = *members
            .first()
            .ok_or(TssError::InsufficientShares {
                required: 1,
                actual: 0,
            })?
            .1;
        if members.iter().any(|(_, g)| *g != &group) {
            return Err(TssError::GroupMismatch);
        }
        if members.iter().any(|(x, _)| x.field() != &self.field) {
            return Err(TssError::FieldMismatch);
        }
        if (members.len() as u64) < group.threshold() {
            return Err(TssError::InsufficientShares {
                required: group.threshold(),
                actual: members.len(),
            });
        }
        let mut seen = HashSet::with_capacity(members.len());
        for (x, _) in &members {
            if !seen.insert(x.to_index_bytes()?) {
                return Err(TssError::InvalidFormat(format!(
                    "share index {} is used twice",
                    x
                )));
            }
        }
        Ok((group, members.into_iter().map(|(x, _)| x.clone()).collect()))
    }
}
