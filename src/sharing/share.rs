use crate::algorithms::field::{FieldElement, FiniteField, ELEMENT_LENGTH, INDEX_LENGTH};
use crate::error::TssError;
use crate::protocol::{Group, GroupId, Parameters};
use std::fmt;

/// One party's evaluation of a sharing polynomial
///
/// Wire format, 64 bytes, integers in the byte order of the field:
/// ```text
///  index(8) | t(8) | n(8) | id(8) | secret(32)
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Share {
    index: FieldElement,
    group: Group,
    secret: FieldElement,
}

impl Share {
    pub const LENGTH: usize = 4 * INDEX_LENGTH + ELEMENT_LENGTH;

    pub fn new(index: FieldElement, group: Group, secret: FieldElement) -> Result<Self, TssError> {
        if index.field() != secret.field() {
            return Err(TssError::FieldMismatch);
        }
        if index.is_zero() {
            return Err(TssError::InvalidFormat(
                "share index must not be zero".to_string(),
            ));
        }
        index.to_index_bytes()?;
        Ok(Share {
            index,
            group,
            secret,
        })
    }

    pub fn index(&self) -> &FieldElement {
        &self.index
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn secret(&self) -> &FieldElement {
        &self.secret
    }

    pub fn field(&self) -> &FiniteField {
        self.secret.field()
    }

    /// The same evaluation point and group holding another value
    pub fn with_secret(&self, secret: FieldElement) -> Result<Self, TssError> {
        Self::new(self.index.clone(), self.group, secret)
    }

    pub fn to_bytes(&self) -> [u8; Share::LENGTH] {
        let endianness = self.field().endianness();
        let mut out = [0u8; Share::LENGTH];
        out[0..8].copy_from_slice(
            &self
                .index
                .to_index_bytes()
                .expect("index is validated on construction"),
        );
        out[8..16].copy_from_slice(&endianness.encode_u64(self.group.threshold()));
        out[16..24].copy_from_slice(&endianness.encode_u64(self.group.share_count()));
        out[24..32].copy_from_slice(&self.group.id.0);
        out[32..64].copy_from_slice(&self.secret.to_bytes());
        out
    }

    pub fn from_bytes(field: &FiniteField, bytes: &[u8]) -> Result<Self, TssError> {
        if bytes.len() != Share::LENGTH {
            return Err(TssError::length("share", Share::LENGTH, bytes.len()));
        }
        let endianness = field.endianness();
        let index = field.index(&bytes[0..8])?;
        let params = Parameters::new(
            endianness.decode_u64(&bytes[8..16])?,
            endianness.decode_u64(&bytes[16..24])?,
        )?;
        let id = GroupId::from_slice(&bytes[24..32])?;
        let secret = field.decode(&bytes[32..64])?;
        Self::new(index, Group::new(params, id), secret)
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Share {{ index: {}, group: {}, secret: [***] }}",
            hex::encode(self.to_bytes()[0..8].to_vec()),
            self.group
        )
    }
}

/// Splits a signer's `point || scalar` broadcast whose sender holds the evaluation point `index`
pub(crate) fn decode_partial(
    field: &FiniteField,
    index: &FieldElement,
    point_length: usize,
    bytes: &[u8],
) -> Result<(Vec<u8>, FieldElement), TssError> {
    let expected = point_length + ELEMENT_LENGTH;
    if bytes.len() != expected {
        return Err(TssError::length("partial signature", expected, bytes.len()));
    }
    if index.field() != field {
        return Err(TssError::FieldMismatch);
    }
    Ok((
        bytes[..point_length].to_vec(),
        field.decode(&bytes[point_length..])?,
    ))
}
