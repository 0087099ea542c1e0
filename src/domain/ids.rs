//! Domain identifier types with validation
//!
//! Newtype wrappers for the names the reporting API hands out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cube name newtype wrapper
///
/// The name doubles as the cube's output directory name, so it must be a
/// single path component.
///
/// # Examples
///
/// ```
/// use cubex::domain::ids::CubeName;
/// use std::str::FromStr;
///
/// let cube = CubeName::from_str("Orders").unwrap();
/// assert_eq!(cube.as_str(), "Orders");
/// assert_eq!(cube.member("updatedAt"), "Orders.updatedAt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeName(String);

impl CubeName {
    /// Creates a new CubeName from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(CubeName)` if the name is valid, `Err` otherwise
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Cube name cannot be empty".to_string());
        }

        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(format!(
                "Invalid cube name '{name}': must be usable as a directory name"
            ));
        }

        Ok(Self(name))
    }

    /// Returns the cube name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Fully qualified member name, e.g. `Orders.updatedAt`
    pub fn member(&self, field: &str) -> String {
        format!("{}.{}", self.0, field)
    }
}

impl fmt::Display for CubeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CubeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CubeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_name_creation() {
        let name = CubeName::new("Orders").unwrap();
        assert_eq!(name.as_str(), "Orders");
        assert_eq!(format!("{name}"), "Orders");
    }

    #[test]
    fn test_cube_name_empty_fails() {
        assert!(CubeName::new("").is_err());
        assert!(CubeName::new("   ").is_err());
    }

    #[test]
    fn test_cube_name_rejects_path_components() {
        assert!(CubeName::new("../etc").is_err());
        assert!(CubeName::new("a\\b").is_err());
        assert!(CubeName::new("..").is_err());
    }

    #[test]
    fn test_cube_name_member() {
        let name: CubeName = "LineItems".parse().unwrap();
        assert_eq!(name.member("updatedAt"), "LineItems.updatedAt");
    }

    #[test]
    fn test_cube_name_serialization() {
        let name = CubeName::new("Stores").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Stores\"");
        let deserialized: CubeName = serde_json::from_str(&json).unwrap();
        assert_eq!(name, deserialized);
    }
}
