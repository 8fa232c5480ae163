//! Polynomials over a scalar field
//!
//! A sharing polynomial of order `t` has the form
//! $` f(x) = a_0 + a_1 x + \ldots + a_{t-1} x^{t-1} `$ where $`a_0`$ is the secret.
use crate::algorithms::field::{FieldElement, FiniteField};
use crate::error::TssError;

#[derive(Clone)]
pub struct Polynomial {
    coefficients: Vec<FieldElement>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<FieldElement>) -> Result<Self, TssError> {
        let first = coefficients.first().ok_or_else(|| {
            TssError::InvalidFormat("polynomial needs at least one coefficient".to_string())
        })?;
        if coefficients.iter().any(|a| a.field() != first.field()) {
            return Err(TssError::FieldMismatch);
        }
        Ok(Polynomial { coefficients })
    }

    /// Polynomial with `order` uniformly random coefficients
    pub fn random(field: &FiniteField, order: usize) -> Result<Self, TssError> {
        if order == 0 {
            return Err(TssError::InvalidFormat(
                "polynomial order must be at least 1".to_string(),
            ));
        }
        Self::new((0..order).map(|_| field.rand()).collect())
    }

    /// Random polynomial of the given order whose constant term is `constant`
    pub fn with_constant(constant: FieldElement, order: usize) -> Result<Self, TssError> {
        let mut polynomial = Self::random(constant.field(), order)?;
        polynomial.coefficients[0] = constant;
        Ok(polynomial)
    }

    pub fn coefficients(&self) -> &[FieldElement] {
        &self.coefficients
    }

    /// Number of coefficients
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    pub fn constant(&self) -> &FieldElement {
        &self.coefficients[0]
    }

    /// Horner evaluation
    pub fn evaluate(&self, x: &FieldElement) -> FieldElement {
        let mut iter = self.coefficients.iter().rev();
        let highest = iter.next().cloned().unwrap_or_else(|| x.field().zero());
        iter.fold(highest, |acc, a| &(&acc * x) + a)
    }
}

impl std::fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Polynomial {{ order: {}, coefficients: [***] }}", self.order())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horner_matches_power_sum() -> anyhow::Result<()> {
        for field in vec![FiniteField::ed25519(), FiniteField::secp256k1()] {
            let polynomial = Polynomial::random(&field, 5)?;
            let x = field.rand();
            let expected = polynomial
                .coefficients()
                .iter()
                .enumerate()
                .fold(field.zero(), |sum, (i, a)| sum + a * &x.pow(i as u64));
            assert_eq!(polynomial.evaluate(&x), expected);
            assert_eq!(&polynomial.evaluate(&field.zero()), polynomial.constant());
        }
        Ok(())
    }

    #[test]
    fn small_polynomial() -> anyhow::Result<()> {
        let field = FiniteField::secp256k1();
        // 3 + 2x + x^2
        let polynomial = Polynomial::new(vec![
            field.from_u64(3),
            field.from_u64(2),
            field.from_u64(1),
        ])?;
        assert_eq!(polynomial.evaluate(&field.from_u64(4)), field.from_u64(27));
        assert_eq!(polynomial.order(), 3);
        Ok(())
    }

    #[test]
    fn constant_is_kept() -> anyhow::Result<()> {
        let field = FiniteField::ed25519();
        let secret = field.rand();
        let polynomial = Polynomial::with_constant(secret.clone(), 3)?;
        assert_eq!(polynomial.constant(), &secret);
        assert_eq!(Polynomial::with_constant(secret, 1)?.order(), 1);
        Ok(())
    }

    #[test]
    fn order_must_be_positive() {
        let field = FiniteField::ed25519();
        assert!(matches!(
            Polynomial::random(&field, 0),
            Err(TssError::InvalidFormat(_))
        ));
        assert!(Polynomial::new(vec![]).is_err());
        assert_eq!(
            Polynomial::new(vec![field.one(), FiniteField::secp256k1().one()]).err(),
            Some(TssError::FieldMismatch)
        );
    }
}
