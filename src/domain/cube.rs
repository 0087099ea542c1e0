//! Cube catalog and page models
//!
//! A cube is a named analytical dataset with ordered dimensions and measures.
//! Pages are the bounded batches of rows returned by a single load query.

use super::ids::CubeName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Field every transactional cube exposes for incremental export
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// One row of a cube, keyed by fully qualified member name
pub type Row = Map<String, Value>;

/// Metadata for one reportable cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeMetadata {
    /// Cube name
    pub name: CubeName,

    /// Dimension member names in catalog order
    pub dimensions: Vec<String>,

    /// Measure member names in catalog order
    pub measures: Vec<String>,
}

impl CubeMetadata {
    /// Create cube metadata
    pub fn new(name: CubeName, dimensions: Vec<String>, measures: Vec<String>) -> Self {
        Self {
            name,
            dimensions,
            measures,
        }
    }

    /// The `<Cube>.updatedAt` member used for incremental export
    pub fn updated_at_member(&self) -> String {
        self.name.member(UPDATED_AT_FIELD)
    }

    /// First declared dimension, the ordering key for full snapshots
    pub fn first_dimension(&self) -> Option<&str> {
        self.dimensions.first().map(String::as_str)
    }
}

/// How a cube is exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// Only rows updated after the checkpoint, appended after existing files
    Incremental,
    /// Every row, rewriting file indices from 1
    FullSnapshot,
}

impl ExportMode {
    /// Classify a cube by membership in the transactional cube set
    pub fn for_cube(cube: &CubeName, transactional: &HashSet<String>) -> Self {
        if transactional.contains(cube.as_str()) {
            Self::Incremental
        } else {
            Self::FullSnapshot
        }
    }

    pub fn is_incremental(self) -> bool {
        self == Self::Incremental
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental => write!(f, "incremental"),
            Self::FullSnapshot => write!(f, "full_snapshot"),
        }
    }
}

/// One response from the load endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
}

impl Page {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn orders() -> CubeMetadata {
        CubeMetadata::new(
            CubeName::new("Orders").unwrap(),
            vec!["Orders.id".to_string(), "Orders.status".to_string()],
            vec!["Orders.count".to_string()],
        )
    }

    #[test]
    fn test_updated_at_member() {
        assert_eq!(orders().updated_at_member(), "Orders.updatedAt");
    }

    #[test]
    fn test_first_dimension() {
        assert_eq!(orders().first_dimension(), Some("Orders.id"));

        let bare = CubeMetadata::new(CubeName::new("Empty").unwrap(), vec![], vec![]);
        assert_eq!(bare.first_dimension(), None);
    }

    #[test]
    fn test_export_mode_classification() {
        let transactional: HashSet<String> = ["Orders".to_string()].into_iter().collect();

        let orders = CubeName::new("Orders").unwrap();
        let stores = CubeName::new("Stores").unwrap();

        assert_eq!(
            ExportMode::for_cube(&orders, &transactional),
            ExportMode::Incremental
        );
        assert_eq!(
            ExportMode::for_cube(&stores, &transactional),
            ExportMode::FullSnapshot
        );
    }

    #[test]
    fn test_export_mode_display() {
        assert_eq!(ExportMode::Incremental.to_string(), "incremental");
        assert_eq!(ExportMode::FullSnapshot.to_string(), "full_snapshot");
    }

    #[test]
    fn test_page_counts() {
        let row = json!({"Orders.id": 1}).as_object().unwrap().clone();
        let page = Page::new(vec![row.clone(), row]);
        assert_eq!(page.row_count(), 2);
        assert!(!page.is_empty());
        assert!(Page::default().is_empty());
    }
}
