//! Per-cube export state machine
//!
//! `Start -> ModeSelected -> Paging -> (PageWritten)* -> Finalizing -> Done`
//!
//! A cube is paged with a constant query shape (same filter, same order) and
//! a moving offset until the service returns a page shorter than the page
//! size. Incremental cubes persist the highest `updatedAt` seen once every
//! page is on disk; a failure anywhere before that leaves the checkpoint file
//! untouched.

use super::query::QueryBuilder;
use super::summary::CubeExportResult;
use super::writer::PageWriter;
use crate::adapters::cube::ReportingApi;
use crate::core::state::{parse_timestamp, Checkpoint, CheckpointStore};
use crate::domain::{CubeMetadata, CubeName, ExportMode, Page, Result};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Phase of a single cube export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPhase {
    Start,
    ModeSelected(ExportMode),
    Paging { page_index: usize },
    PageWritten { path: PathBuf },
    Finalizing,
    Done,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::ModeSelected(mode) => write!(f, "mode_selected({mode})"),
            Self::Paging { page_index } => write!(f, "paging({page_index})"),
            Self::PageWritten { path } => write!(f, "page_written({})", path.display()),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// What an export of a cube would do, without fetching any data
#[derive(Debug, Clone, PartialEq)]
pub struct CubePlan {
    pub cube: CubeName,
    pub mode: ExportMode,
    /// Filter boundary for incremental cubes
    pub checkpoint: Option<Checkpoint>,
    /// Index the first written page would get
    pub next_index: u64,
}

/// Exports one cube at a time against the reporting API
pub struct CubeExporter {
    api: Arc<dyn ReportingApi>,
    store: CheckpointStore,
    transactional: HashSet<String>,
    page_size: usize,
}

impl CubeExporter {
    pub fn new(
        api: Arc<dyn ReportingApi>,
        store: CheckpointStore,
        transactional: HashSet<String>,
        page_size: usize,
    ) -> Self {
        Self {
            api,
            store,
            transactional,
            page_size: page_size.max(1),
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn mode_for(&self, cube: &CubeName) -> ExportMode {
        ExportMode::for_cube(cube, &self.transactional)
    }

    /// Starting checkpoint: stored or fallback for incremental cubes
    ///
    /// Full snapshots never read the checkpoint file.
    async fn starting_checkpoint(&self, cube: &CubeName, mode: ExportMode) -> Result<Checkpoint> {
        match mode {
            ExportMode::Incremental => self.store.load(cube).await,
            ExportMode::FullSnapshot => Ok(Checkpoint::new(cube.clone(), self.store.fallback())),
        }
    }

    /// Describe the export of a cube without touching the API or the disk
    pub async fn plan(&self, cube: &CubeMetadata) -> Result<CubePlan> {
        let mode = self.mode_for(&cube.name);
        let checkpoint = match mode {
            ExportMode::Incremental => Some(self.store.load(&cube.name).await?),
            ExportMode::FullSnapshot => None,
        };
        let writer = PageWriter::open(self.store.cube_dir(&cube.name), mode).await?;

        Ok(CubePlan {
            cube: cube.name.clone(),
            mode,
            checkpoint,
            next_index: writer.next_index(),
        })
    }

    /// Export every page of a cube and persist its checkpoint
    ///
    /// # Errors
    ///
    /// Any API or filesystem error aborts the cube. Pages written before the
    /// error stay on disk; the checkpoint is not updated.
    pub async fn export(&self, cube: &CubeMetadata) -> Result<CubeExportResult> {
        let started = Instant::now();
        let name = &cube.name;
        self.enter(name, ExportPhase::Start);

        let mode = self.mode_for(name);
        self.enter(name, ExportPhase::ModeSelected(mode));

        if mode == ExportMode::FullSnapshot && cube.first_dimension().is_none() {
            tracing::warn!(cube = %name, "Cube has no dimensions, paging without ordering");
        }

        let since = self.starting_checkpoint(name, mode).await?;
        let mut latest = since.clone();
        let mut writer = PageWriter::open(self.store.cube_dir(name), mode).await?;
        let mut result = CubeExportResult::new(name.clone(), mode);

        crate::log_cube_start!(name, mode, since.formatted(), writer.next_index());

        let mut page_index = 0;
        loop {
            self.enter(name, ExportPhase::Paging { page_index });

            let query = QueryBuilder::build(cube, mode, &since, page_index, self.page_size);
            let page = self.api.run_query(&query).await?;
            let row_count = page.row_count();

            result.pages_fetched += 1;
            result.rows_exported += row_count;

            if mode.is_incremental() {
                track_latest(&mut latest, cube, &page);
            }

            if let Some(path) = writer.write(&page).await? {
                self.enter(name, ExportPhase::PageWritten { path: path.clone() });
                result.files.push(path);
            }

            page_index += 1;
            if row_count < self.page_size {
                break;
            }
        }

        self.enter(name, ExportPhase::Finalizing);
        match mode {
            ExportMode::Incremental => {
                self.store.save(&latest).await?;
                result.checkpoint = Some(latest.timestamp);
            }
            ExportMode::FullSnapshot => {
                let stale = writer.stale_pages().await?;
                if stale > 0 {
                    tracing::warn!(
                        cube = %name,
                        stale_pages = stale,
                        "Pages from a longer earlier snapshot remain in the cube directory"
                    );
                }
            }
        }

        result.duration = started.elapsed();
        self.enter(name, ExportPhase::Done);

        crate::log_cube_complete!(
            name,
            result.files.len(),
            result.rows_exported,
            result.duration
        );

        Ok(result)
    }

    fn enter(&self, cube: &CubeName, phase: ExportPhase) {
        tracing::debug!(cube = %cube, phase = %phase, "Export phase");
    }
}

/// Fold every row's `<Cube>.updatedAt` into the running maximum
fn track_latest(latest: &mut Checkpoint, cube: &CubeMetadata, page: &Page) {
    let member = cube.updated_at_member();
    let mut unreadable = 0usize;

    for row in &page.rows {
        match row.get(&member).and_then(|v| v.as_str()).map(parse_timestamp) {
            Some(Ok(updated_at)) => {
                latest.observe(updated_at);
            }
            _ => unreadable += 1,
        }
    }

    if unreadable > 0 {
        tracing::warn!(
            cube = %cube.name,
            member = %member,
            rows = unreadable,
            "Rows without a readable updatedAt do not advance the checkpoint"
        );
    }
}
