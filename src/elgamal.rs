//! ElGamal-style encryption under a curve public key, used to hand key shares to their holders
//!
//! The ephemeral point and the shared point are trimmed to 32 bytes, which for secp256k1 drops the
//! parity prefix: both `R` and `-R` lead to the same x coordinate of the shared point.
use crate::algorithms::field::{FieldElement, ELEMENT_LENGTH};
use crate::curve::Curve;
use crate::error::TssError;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

const TRIMMED_LENGTH: usize = 32;
const EVEN_PREFIX: u8 = 0x02;

/// Encrypts one canonical field element: `trim(kG) || m + trim(kP)`
#[derive(Clone, Debug)]
pub struct ElGamal<C: Curve> {
    curve: C,
}

impl<C: Curve> ElGamal<C> {
    pub const CIPHER_TEXT_LENGTH: usize = TRIMMED_LENGTH + ELEMENT_LENGTH;

    pub fn new(curve: C) -> Self {
        ElGamal { curve }
    }

    pub fn curve(&self) -> &C {
        &self.curve
    }

    /// `message` must be the 32 byte encoding of a reduced scalar; other values are rejected, not reduced.
    pub fn encrypt(&self, message: &[u8], public_key: &[u8]) -> Result<Vec<u8>, TssError> {
        let m = self.curve.scalar_field().decode(message)?;
        let (big_r, mask) = self.ephemeral(public_key)?;
        let c = m + &self.curve.scalar_field().norm(&mask[..]);

        let mut out = Vec::with_capacity(Self::CIPHER_TEXT_LENGTH);
        out.extend_from_slice(&big_r);
        out.extend_from_slice(&c.to_bytes());
        Ok(out)
    }

    pub fn decrypt(
        &self,
        cipher_text: &[u8],
        private_key: &[u8],
    ) -> Result<[u8; ELEMENT_LENGTH], TssError> {
        if cipher_text.len() != Self::CIPHER_TEXT_LENGTH {
            return Err(TssError::length(
                "cipher text",
                Self::CIPHER_TEXT_LENGTH,
                cipher_text.len(),
            ));
        }
        let field = self.curve.scalar_field();
        let mask = self.shared_secret(&cipher_text[..TRIMMED_LENGTH], private_key)?;
        let c: FieldElement = field.decode(&cipher_text[TRIMMED_LENGTH..])?;
        Ok((c - &field.norm(&mask[..])).to_bytes())
    }

    /// Fresh `trim(kG)` and `trim(kP)`
    fn ephemeral(
        &self,
        public_key: &[u8],
    ) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), TssError> {
        if public_key.len() != self.curve.point_length() {
            return Err(TssError::length(
                "public key",
                self.curve.point_length(),
                public_key.len(),
            ));
        }
        let k = self.curve.scalar_field().rand_nonzero();
        let shared = self.curve.mul_scalar(public_key, &k)?;
        let big_r = self.curve.base_mul(&k);
        Ok((self.trim(&big_r)?, Zeroizing::new(self.trim(&shared)?)))
    }

    /// `trim(dR)` for a trimmed ephemeral point
    fn shared_secret(
        &self,
        trimmed: &[u8],
        private_key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, TssError> {
        let d = self.curve.derived_key(private_key)?;
        let shared = self.curve.mul_scalar(&self.untrim(trimmed), &d)?;
        Ok(Zeroizing::new(self.trim(&shared)?))
    }

    fn trim(&self, point: &[u8]) -> Result<Vec<u8>, TssError> {
        let offset = point
            .len()
            .checked_sub(TRIMMED_LENGTH)
            .ok_or_else(|| TssError::length("point", TRIMMED_LENGTH, point.len()))?;
        Ok(point[offset..].to_vec())
    }

    fn untrim(&self, trimmed: &[u8]) -> Vec<u8> {
        if self.curve.point_length() > TRIMMED_LENGTH {
            let mut point = Vec::with_capacity(self.curve.point_length());
            point.push(EVEN_PREFIX);
            point.extend_from_slice(trimmed);
            point
        } else {
            trimmed.to_vec()
        }
    }
}

/// Block stream over [`ElGamal`] for messages of any length
///
/// Every 30 byte chunk is carried in a 64 byte block `trim(kG) || ([parity, len, padding, chunk] ^ trim(kP))`.
#[derive(Clone, Debug)]
pub struct ExtendedElGamal<C: Curve> {
    inner: ElGamal<C>,
}

impl<C: Curve> ExtendedElGamal<C> {
    pub const PLAIN_TEXT_LENGTH: usize = 30;
    pub const BLOCK_LENGTH: usize = TRIMMED_LENGTH + ELEMENT_LENGTH;

    pub fn new(curve: C) -> Self {
        ExtendedElGamal {
            inner: ElGamal::new(curve),
        }
    }

    pub fn encrypt(&self, message: &[u8], public_key: &[u8]) -> Result<Vec<u8>, TssError> {
        let mut out = Vec::with_capacity(
            (message.len() + Self::PLAIN_TEXT_LENGTH - 1) / Self::PLAIN_TEXT_LENGTH
                * Self::BLOCK_LENGTH,
        );
        for chunk in message.chunks(Self::PLAIN_TEXT_LENGTH) {
            let mut block = Zeroizing::new([0u8; ELEMENT_LENGTH]);
            block[0] = parity(chunk);
            block[1] = chunk.len() as u8;
            let start = ELEMENT_LENGTH - chunk.len();
            OsRng.fill_bytes(&mut block[2..start]);
            block[start..].copy_from_slice(chunk);

            let (big_r, mask) = self.inner.ephemeral(public_key)?;
            out.extend_from_slice(&big_r);
            out.extend(block.iter().zip(mask.iter()).map(|(b, m)| b ^ m));
        }
        log::trace!(
            "encrypted {} bytes into {} blocks",
            message.len(),
            out.len() / Self::BLOCK_LENGTH
        );
        Ok(out)
    }

    pub fn decrypt(&self, cipher_text: &[u8], private_key: &[u8]) -> Result<Vec<u8>, TssError> {
        if cipher_text.len() % Self::BLOCK_LENGTH != 0 {
            return Err(TssError::InvalidLength {
                what: "cipher text",
                expected: (cipher_text.len() / Self::BLOCK_LENGTH + 1) * Self::BLOCK_LENGTH,
                actual: cipher_text.len(),
            });
        }
        let mut out =
            Vec::with_capacity(cipher_text.len() / Self::BLOCK_LENGTH * Self::PLAIN_TEXT_LENGTH);
        for block in cipher_text.chunks(Self::BLOCK_LENGTH) {
            let mask = self.inner.shared_secret(&block[..TRIMMED_LENGTH], private_key)?;
            let plain = Zeroizing::new(
                block[TRIMMED_LENGTH..]
                    .iter()
                    .zip(mask.iter())
                    .map(|(c, m)| c ^ m)
                    .collect::<Vec<u8>>(),
            );
            let len = plain[1] as usize;
            if len > Self::PLAIN_TEXT_LENGTH {
                return Err(TssError::IncorrectCipherText);
            }
            let chunk = &plain[ELEMENT_LENGTH - len..];
            if plain[0] != parity(chunk) {
                return Err(TssError::IncorrectCipherText);
            }
            out.extend_from_slice(chunk);
        }
        Ok(out)
    }
}

/// Parity of the number of set bits in the xor of all bytes
fn parity(bytes: &[u8]) -> u8 {
    (bytes.iter().fold(0u8, |acc, b| acc ^ b).count_ones() & 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{Ed25519Curve, Secp256k1Curve};

    fn round_trip<C: Curve + Clone>(curve: C) -> anyhow::Result<()> {
        let private_key = [0x2au8; 32];
        let public_key = curve.public_key(&private_key)?;
        let elgamal = ElGamal::new(curve.clone());

        let message = curve.scalar_field().rand().to_bytes();
        let cipher_text = elgamal.encrypt(&message, &public_key)?;
        assert_eq!(cipher_text.len(), 64);
        assert_eq!(elgamal.decrypt(&cipher_text, &private_key)?, message);
        assert_ne!(elgamal.decrypt(&cipher_text, &[0x2bu8; 32])?, message);
        // fresh randomness every time
        assert_ne!(elgamal.encrypt(&message, &public_key)?, cipher_text);
        Ok(())
    }

    #[test]
    fn ed25519_round_trip() -> anyhow::Result<()> {
        round_trip(Ed25519Curve::new())
    }

    #[test]
    fn secp256k1_round_trip() -> anyhow::Result<()> {
        round_trip(Secp256k1Curve::new())
    }

    #[test]
    fn key_share_transport() -> anyhow::Result<()> {
        let curve = Secp256k1Curve::new();
        let recipient = [0x11u8; 32];
        let elgamal = ElGamal::new(curve.clone());
        let share = crate::sharing::SecretSharing::for_curve(&curve).share(
            &curve.scalar_field().rand(),
            &crate::protocol::Parameters::new(2, 3)?,
            &[],
            None,
        )?;
        let secret = share[0].secret().to_bytes();
        let cipher_text = elgamal.encrypt(&secret, &curve.public_key(&recipient)?)?;
        assert_eq!(elgamal.decrypt(&cipher_text, &recipient)?, secret);
        Ok(())
    }

    #[test]
    fn rejects_invalid_messages() -> anyhow::Result<()> {
        let curve = Ed25519Curve::new();
        let public_key = curve.public_key(&[1u8; 32])?;
        let elgamal = ElGamal::new(curve);
        assert!(matches!(
            elgamal.encrypt(&[0xffu8; 32], &public_key),
            Err(TssError::InvalidFormat(_))
        ));
        assert!(matches!(
            elgamal.encrypt(&[1u8; 31], &public_key),
            Err(TssError::InvalidLength { .. })
        ));
        assert!(matches!(
            elgamal.encrypt(&[1u8; 32], &public_key[1..]),
            Err(TssError::InvalidLength { .. })
        ));
        assert!(matches!(
            elgamal.decrypt(&[1u8; 63], &[1u8; 32]),
            Err(TssError::InvalidLength { .. })
        ));
        Ok(())
    }

    fn extended_round_trip<C: Curve + Clone>(curve: C) -> anyhow::Result<()> {
        let private_key = [0x5eu8; 32];
        let public_key = curve.public_key(&private_key)?;
        let elgamal = ExtendedElGamal::new(curve);
        for &len in &[0usize, 1, 29, 30, 31, 60, 61, 100] {
            let message = (0..len).map(|i| (i * 7 + 3) as u8).collect::<Vec<u8>>();
            let cipher_text = elgamal.encrypt(&message, &public_key)?;
            assert_eq!(cipher_text.len(), (len + 29) / 30 * 64);
            assert_eq!(elgamal.decrypt(&cipher_text, &private_key)?, message);
        }
        Ok(())
    }

    #[test]
    fn ed25519_extended_round_trip() -> anyhow::Result<()> {
        extended_round_trip(Ed25519Curve::new())
    }

    #[test]
    fn secp256k1_extended_round_trip() -> anyhow::Result<()> {
        extended_round_trip(Secp256k1Curve::new())
    }

    #[test]
    fn extended_rejects_tampering() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let curve = Ed25519Curve::new();
        let private_key = [9u8; 32];
        let public_key = curve.public_key(&private_key)?;
        let elgamal = ExtendedElGamal::new(curve);
        let message =
            b"a message long enough to span several blocks of the stream cipher text".repeat(3);
        let cipher_text = elgamal.encrypt(&message, &public_key)?;

        let mut flipped = cipher_text.clone();
        flipped[32] ^= 1;
        assert_eq!(
            elgamal.decrypt(&flipped, &private_key).err(),
            Some(TssError::IncorrectCipherText)
        );

        let mut overlong = cipher_text.clone();
        overlong[33] ^= 0x40;
        assert_eq!(
            elgamal.decrypt(&overlong, &private_key).err(),
            Some(TssError::IncorrectCipherText)
        );
        assert!(elgamal.decrypt(&cipher_text, &[8u8; 32]).is_err());
        assert!(matches!(
            elgamal.decrypt(&cipher_text[1..], &private_key),
            Err(TssError::InvalidLength { .. })
        ));
        assert!(elgamal.decrypt(&[], &private_key)?.is_empty());
        Ok(())
    }

    #[test]
    fn parity_bit() {
        assert_eq!(parity(&[]), 0);
        assert_eq!(parity(&[1]), 1);
        assert_eq!(parity(&[3]), 0);
        assert_eq!(parity(&[1, 2]), 0);
        assert_eq!(parity(&[0xff, 0x01]), 1);
    }
}
