use crate::algorithms::field::FieldElement;
use crate::algorithms::polynomial::Polynomial;
use crate::curve::Curve;
use crate::error::TssError;
use serde::{Deserialize, Serialize};

/// Feldman commitment to a sharing polynomial
///
/// Holds $` C_j = a_j \cdot G `$ for every coefficient, so that anybody can compute
/// $` f(x) \cdot G = \sum_j C_j x^j `$ without learning $`f`$.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    points: Vec<Vec<u8>>,
}

impl Commitment {
    pub fn new(points: Vec<Vec<u8>>) -> Self {
        Commitment { points }
    }

    pub fn from_polynomial<C: Curve + ?Sized>(curve: &C, polynomial: &Polynomial) -> Self {
        Commitment {
            points: polynomial
                .coefficients()
                .iter()
                .map(|a| curve.base_mul(a))
                .collect(),
        }
    }

    pub fn points(&self) -> &[Vec<u8>] {
        &self.points
    }

    /// Commitment to the constant term, i.e. `secret * G`.
    ///
    /// For a key sharing this is the group public key.
    pub fn constant(&self) -> Option<&[u8]> {
        self.points.first().map(Vec::as_slice)
    }

    /// `f(x) * G`, evaluated with Horner's rule in the exponent
    pub fn evaluate<C: Curve + ?Sized>(
        &self,
        curve: &C,
        x: &FieldElement,
    ) -> Result<Vec<u8>, TssError> {
        let mut iter = self.points.iter().rev();
        let highest = iter.next().ok_or_else(|| {
            TssError::InvalidFormat("commitment holds no points".to_string())
        })?;
        iter.try_fold(highest.clone(), |acc, point| {
            curve.add_point(&curve.mul_scalar(&acc, x)?, point)
        })
    }

    /// Commitment to the sum of two polynomials of the same order
    pub fn combine<C: Curve + ?Sized>(
        &self,
        curve: &C,
        other: &Commitment,
    ) -> Result<Commitment, TssError> {
        if self.points.len() != other.points.len() {
            return Err(TssError::length(
                "commitment",
                self.points.len(),
                other.points.len(),
            ));
        }
        let points = self
            .points
            .iter()
            .zip(other.points.iter())
            .map(|(a, b)| curve.add_point(a, b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Commitment { points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Ed25519Curve, Secp256k1Curve};

    fn evaluates_in_the_exponent<C: Curve>(curve: &C) -> anyhow::Result<()> {
        let field = curve.scalar_field();
        let f = Polynomial::random(field, 4)?;
        let g = Polynomial::random(field, 4)?;
        let commitment = Commitment::from_polynomial(curve, &f);

        let x = field.rand_index(&[])?;
        assert_eq!(commitment.evaluate(curve, &x)?, curve.base_mul(&f.evaluate(&x)));
        assert_eq!(commitment.constant(), Some(curve.base_mul(f.constant()).as_slice()));

        let sum = commitment.combine(curve, &Commitment::from_polynomial(curve, &g))?;
        assert_eq!(
            sum.evaluate(curve, &x)?,
            curve.base_mul(&(f.evaluate(&x) + g.evaluate(&x)))
        );
        Ok(())
    }

    #[test]
    fn ed25519_commitment() -> anyhow::Result<()> {
        evaluates_in_the_exponent(&Ed25519Curve::new())
    }

    #[test]
    fn secp256k1_commitment() -> anyhow::Result<()> {
        evaluates_in_the_exponent(&Secp256k1Curve::new())
    }

    #[test]
    fn shapes_must_agree() -> anyhow::Result<()> {
        let curve = Ed25519Curve::new();
        let f = Polynomial::random(curve.scalar_field(), 2)?;
        let g = Polynomial::random(curve.scalar_field(), 3)?;
        let a = Commitment::from_polynomial(&curve, &f);
        let b = Commitment::from_polynomial(&curve, &g);
        assert!(a.combine(&curve, &b).is_err());
        assert!(Commitment::new(vec![])
            .evaluate(&curve, &curve.scalar_field().one())
            .is_err());

        let json = serde_json::to_string(&a)?;
        assert_eq!(serde_json::from_str::<Commitment>(&json)?, a);
        Ok(())
    }
}
