use std::fmt;
use std::str::FromStr;

/// Content fingerprint of a record.
///
/// BLAKE3 digest of the record's dedup-relevant fields. Two records with the
/// same fingerprint are the same logical entry, no matter when they were
/// captured.
#[cfg_attr(feature = "bincode", derive(::bincode::Encode, ::bincode::Decode))]
#[derive(Copy, Clone, Hash, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash an ordered list of field values.
    ///
    /// Every field is length-prefixed, so `("ab", "c")` and `("a", "bc")`
    /// produce different fingerprints.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in fields {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.finalize().into()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<blake3::Hash> for Fingerprint {
    fn from(value: blake3::Hash) -> Self {
        Self(*value.as_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        data_encoding::HEXLOWER.encode_write(self.as_slice(), f)
    }
}

impl FromStr for Fingerprint {
    type Err = data_encoding::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = data_encoding::HEXLOWER_PERMISSIVE.decode(s.as_bytes())?;
        let a = v.try_into().map_err(|_| data_encoding::DecodeError {
            position: 0,
            kind: data_encoding::DecodeKind::Length,
        })?;
        Ok(Self(a))
    }
}
