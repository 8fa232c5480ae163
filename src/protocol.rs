//! Defines some common data types

use crate::error::TssError;
use core::fmt::{Error, Formatter};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::convert::TryInto;
use std::fmt::{self, Debug, Display};

/// Byte order of every multi-byte integer in the encodings of a field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    pub fn encode_u64(self, value: u64) -> [u8; 8] {
        match self {
            Endianness::Big => value.to_be_bytes(),
            Endianness::Little => value.to_le_bytes(),
        }
    }

    pub fn decode_u64(self, bytes: &[u8]) -> Result<u64, TssError> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| TssError::length("integer", 8, bytes.len()))?;
        Ok(match self {
            Endianness::Big => u64::from_be_bytes(bytes),
            Endianness::Little => u64::from_le_bytes(bytes),
        })
    }
}

/// Parameters of a sharing instance
///
/// # Key Attributes
///
/// * `threshold` - number of shares required to reconstruct the secret, so that the sharing polynomial has degree `threshold - 1`
/// * `share_count` - number of shares dealt
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Parameters {
    threshold: u64,   //t
    share_count: u64, //n
}

impl Parameters {
    /// Constructs new Parameters conditioned they satisfy `1 <= threshold <= share_count`.
    ///
    /// `threshold = 1` is legal: every share then equals the secret itself.
    pub fn new(threshold: u64, share_count: u64) -> Result<Self, TssError> {
        if share_count < 1 {
            return Err(TssError::InvalidFormat(format!(
                "Number of shares must be at least 1, got {}",
                share_count
            )));
        }

        if threshold < 1 {
            return Err(TssError::InvalidFormat(format!(
                "Threshold must be at least 1, got: {}",
                threshold
            )));
        }

        if threshold > share_count {
            return Err(TssError::InvalidFormat(format!(
                "Threshold {} cannot be greater than number of shares {}",
                threshold, share_count
            )));
        }

        Ok(Parameters {
            threshold,
            share_count,
        })
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn share_count(&self) -> u64 {
        self.share_count
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{threshold: {}, share_count: {}}}",
            self.threshold, self.share_count
        )
    }
}

/// Tag of a sharing instance
///
/// Shares dealt by one call carry the same tag; shares of different instances must never be interpolated together.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupId(pub [u8; 8]);

impl GroupId {
    pub fn random() -> Self {
        let mut id = [0u8; 8];
        OsRng.fill_bytes(&mut id);
        GroupId(id)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, TssError> {
        let id: [u8; 8] = slice.try_into().map_err(|_| {
            TssError::InvalidFormat(format!(
                "group id is required to be 8 bytes long, got {}",
                slice.len()
            ))
        })?;
        Ok(GroupId(id))
    }

    fn write_as_hex_str(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.write_as_hex_str(f)
    }
}

impl Debug for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.write_as_hex_str(f)
    }
}

/// Identity of a sharing instance: its parameters and its tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub params: Parameters,
    pub id: GroupId,
}

impl Group {
    pub fn new(params: Parameters, id: GroupId) -> Self {
        Group { params, id }
    }

    pub fn threshold(&self) -> u64 {
        self.params.threshold()
    }

    pub fn share_count(&self) -> u64 {
        self.params.share_count()
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{} {}", self.id, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters() {
        assert!(Parameters::new(1, 1).is_ok());
        assert!(Parameters::new(3, 5).is_ok());
        assert!(matches!(
            Parameters::new(0, 3),
            Err(TssError::InvalidFormat(_))
        ));
        assert!(matches!(
            Parameters::new(1, 0),
            Err(TssError::InvalidFormat(_))
        ));
        assert!(matches!(
            Parameters::new(4, 3),
            Err(TssError::InvalidFormat(_))
        ));
    }

    #[test]
    fn group_id() -> anyhow::Result<()> {
        let id = GroupId::from_slice(&[0xab; 8])?;
        assert_eq!(id.to_string(), "abababababababab");
        assert!(GroupId::from_slice(&[1; 7]).is_err());
        assert!(GroupId::from_slice(&[1; 9]).is_err());

        let group = Group::new(Parameters::new(2, 3)?, id);
        let json = serde_json::to_string(&group)?;
        assert_eq!(serde_json::from_str::<Group>(&json)?, group);
        Ok(())
    }

    #[test]
    fn integers_follow_endianness() -> anyhow::Result<()> {
        assert_eq!(Endianness::Little.encode_u64(1), [1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Endianness::Big.encode_u64(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(Endianness::Big.decode_u64(&Endianness::Big.encode_u64(77))?, 77);
        assert!(Endianness::Little.decode_u64(&[1, 2, 3]).is_err());
        Ok(())
    }
}
