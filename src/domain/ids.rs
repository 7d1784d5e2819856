//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that travel through an ingestion run.
//! Each type ensures type safety and validates its format on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a run identifier
const MAX_RUN_ID_LEN: usize = 64;

/// Run identifier newtype wrapper
///
/// Identifies one ingestion run (the receipt number of an upload). The same
/// run identifier is reused across restarts so the checkpoint can be resumed.
/// Only ASCII alphanumerics, `-`, `_` and `.` are accepted because the
/// identifier doubles as a checkpoint file name.
///
/// # Examples
///
/// ```
/// use sluice::domain::ids::RunId;
/// use std::str::FromStr;
///
/// let run_id = RunId::from_str("R-2025-000123").unwrap();
/// assert_eq!(run_id.as_str(), "R-2025-000123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Creates a new RunId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(RunId)` if the ID is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Run ID cannot be empty".to_string());
        }
        if id.len() > MAX_RUN_ID_LEN {
            return Err(format!(
                "Run ID cannot exceed {MAX_RUN_ID_LEN} characters, got {}",
                id.len()
            ));
        }
        if id.starts_with('.') {
            return Err("Run ID cannot start with '.'".to_string());
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(format!("Run ID contains invalid character '{c}': {id}"));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random run identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the run ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source file key newtype wrapper
///
/// Relative key of the source file inside the configured source location
/// (an object key for HTTP sources, a relative path for local sources).
///
/// # Examples
///
/// ```
/// use sluice::domain::ids::SourceKey;
///
/// let key = SourceKey::new("uploads/2025/members.csv").unwrap();
/// assert_eq!(key.file_name(), "members.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey(String);

impl SourceKey {
    /// Creates a new SourceKey from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(SourceKey)` if the key is valid, `Err` otherwise
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Source key cannot be empty".to_string());
        }
        if key.starts_with('/') {
            return Err(format!("Source key must be relative: {key}"));
        }
        if key.split('/').any(|segment| segment == "..") {
            return Err(format!("Source key cannot contain '..' segments: {key}"));
        }
        if key.ends_with('/') {
            return Err(format!("Source key must name a file: {key}"));
        }
        Ok(Self(key))
    }

    /// Returns the source key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path segment of the key
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SourceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_creation() {
        let id = RunId::new("R-2025-000123").unwrap();
        assert_eq!(id.as_str(), "R-2025-000123");
    }

    #[test]
    fn test_run_id_empty_fails() {
        assert!(RunId::new("").is_err());
        assert!(RunId::new("   ").is_err());
    }

    #[test]
    fn test_run_id_rejects_path_characters() {
        assert!(RunId::new("../etc/passwd").is_err());
        assert!(RunId::new("a/b").is_err());
        assert!(RunId::new(".hidden").is_err());
    }

    #[test]
    fn test_run_id_length_limit() {
        assert!(RunId::new("a".repeat(64)).is_ok());
        assert!(RunId::new("a".repeat(65)).is_err());
    }

    #[test]
    fn test_run_id_generate_is_valid() {
        let id = RunId::generate();
        assert!(RunId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_source_key_validation() {
        assert!(SourceKey::new("members.csv").is_ok());
        assert!(SourceKey::new("").is_err());
        assert!(SourceKey::new("/abs/members.csv").is_err());
        assert!(SourceKey::new("a/../members.csv").is_err());
        assert!(SourceKey::new("dir/").is_err());
    }

    #[test]
    fn test_source_key_file_name() {
        let key = SourceKey::new("uploads/2025/members.csv").unwrap();
        assert_eq!(key.file_name(), "members.csv");
        let flat = SourceKey::new("members.csv").unwrap();
        assert_eq!(flat.file_name(), "members.csv");
    }

    #[test]
    fn test_run_id_serialization() {
        let id = RunId::new("R-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"R-1\"");
        let deserialized: RunId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
