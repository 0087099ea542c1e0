//! Cube catalog retrieval and selection

use crate::adapters::cube::ReportingApi;
use crate::config::ExportConfig;
use crate::domain::{CubeMetadata, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Include/exclude selection of cubes
///
/// An empty include list selects every cube; the exclude list always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CubeFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl CubeFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(
            config.include_cubes.iter().cloned(),
            config.exclude_cubes.iter().cloned(),
        )
    }

    pub fn allows(&self, cube: &str) -> bool {
        (self.include.is_empty() || self.include.contains(cube)) && !self.exclude.contains(cube)
    }

    /// Included names the catalog does not contain
    pub fn unknown_includes<'a>(&'a self, catalog: &[CubeMetadata]) -> Vec<&'a str> {
        let known: HashSet<&str> = catalog.iter().map(|c| c.name.as_str()).collect();
        let mut unknown: Vec<&str> = self
            .include
            .iter()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect();
        unknown.sort_unstable();
        unknown
    }
}

/// Fetches the cube catalog once per run
pub struct MetadataFetcher {
    api: Arc<dyn ReportingApi>,
    filter: CubeFilter,
}

impl MetadataFetcher {
    pub fn new(api: Arc<dyn ReportingApi>, filter: CubeFilter) -> Self {
        Self { api, filter }
    }

    /// Cubes selected for export, in catalog order
    pub async fn list_cubes(&self) -> Result<Vec<CubeMetadata>> {
        let catalog = self.api.fetch_catalog().await?;

        for name in self.filter.unknown_includes(&catalog) {
            tracing::warn!(cube = %name, "Included cube is not in the catalog");
        }

        let total = catalog.len();
        let selected: Vec<CubeMetadata> = catalog
            .into_iter()
            .filter(|cube| self.filter.allows(cube.name.as_str()))
            .collect();

        tracing::info!(
            catalog = total,
            selected = selected.len(),
            "Selected cubes for export"
        );

        Ok(selected)
    }
}
