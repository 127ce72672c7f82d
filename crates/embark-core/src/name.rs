//! Validated component names.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The unique identifier of a component within a workspace.
///
/// Every registry and orchestrator operation is keyed by name, so names are
/// validated once at the boundary: non-empty and free of path separators
/// (they double as directory names under the workspace root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidName("name must not be empty".to_string()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::InvalidName(format!(
                "{name:?} is not a valid component name"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ComponentName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(ComponentName::new("LCD_platform").is_ok());
        assert!(ComponentName::new("app-1").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_path_like() {
        assert!(matches!(
            ComponentName::new(""),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            ComponentName::new("   "),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            ComponentName::new("a/b"),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            ComponentName::new(".."),
            Err(Error::InvalidName(_))
        ));
    }
}
