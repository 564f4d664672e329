#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Participant identifier as it appears in every input table.
///
/// Identifiers are compared as trimmed text; the ordering is lexicographic,
/// which fixes the row order of every output table.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSubjectId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_blank() {
        assert_eq!(SubjectId::new(" 1001 ").unwrap().as_str(), "1001");
        assert!(matches!(
            SubjectId::new("   "),
            Err(ModelError::InvalidSubjectId(_))
        ));
    }
}
