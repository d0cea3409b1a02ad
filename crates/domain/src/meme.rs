use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Maximum meme name length in bytes, as allocated by the program.
pub const MAX_NAME_LEN: usize = 32;
/// Maximum meme URI length in bytes, as allocated by the program.
pub const MAX_URI_LEN: usize = 100;
/// Maximum length of a single PDA seed.
pub const MAX_SEED_LEN: usize = 32;

/// Metadata for a `create_meme` call, checked against the account limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeMetadata {
    /// Seed used to derive the meme PDA.
    pub index: String,
    /// Display name.
    pub name: String,
    /// Metadata URI.
    pub uri: String,
}

impl MemeMetadata {
    pub fn new(
        index: impl Into<String>,
        name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let meme = Self {
            index: index.into(),
            name: name.into(),
            uri: uri.into(),
        };
        meme.validate()?;
        Ok(meme)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.index.is_empty() {
            return Err(DomainError::EmptyField("index"));
        }
        check_len("index", &self.index, MAX_SEED_LEN)?;
        check_len("name", &self.name, MAX_NAME_LEN)?;
        check_len("uri", &self.uri, MAX_URI_LEN)
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.len() > max {
        return Err(DomainError::FieldTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}
