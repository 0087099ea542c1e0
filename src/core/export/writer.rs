//! Sequentially numbered page files
//!
//! Each non-empty page of a cube lands in `<output_dir>/<Cube>/<index>.json`
//! where `index` is a 7-digit zero-padded counter. Full snapshots restart the
//! counter at 1 on every run; incremental exports continue after the highest
//! index already on disk.

use crate::domain::{CubexError, ExportMode, Page, Result};
use std::path::{Path, PathBuf};

/// File extension of page files
pub const PAGE_EXTENSION: &str = "json";

/// File name for a page index, e.g. `0000001.json`
pub fn page_file_name(index: u64) -> String {
    format!("{index:07}.{PAGE_EXTENSION}")
}

/// Index encoded in a page file name, `None` for any other file
pub fn page_index(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != PAGE_EXTENSION {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    stem.parse().ok()
}

/// Highest page index present in a directory, `None` if there are no pages
///
/// # Errors
///
/// Returns a filesystem error if the directory exists but cannot be listed.
pub async fn max_page_index(dir: &Path) -> Result<Option<u64>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CubexError::Filesystem(format!(
                "Failed to list {}: {e}",
                dir.display()
            )))
        }
    };

    let mut max = None;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(index) = page_index(&entry.path()) {
            max = max.max(Some(index));
        }
    }

    Ok(max)
}

/// Writes the pages of one cube run
#[derive(Debug)]
pub struct PageWriter {
    dir: PathBuf,
    next_index: u64,
    files_written: usize,
}

impl PageWriter {
    /// Open a writer for a cube directory, seeding the counter once
    ///
    /// Incremental: one past the highest existing index (1 for an empty or
    /// missing directory). Full snapshot: always 1.
    pub async fn open(dir: impl Into<PathBuf>, mode: ExportMode) -> Result<Self> {
        let dir = dir.into();

        let next_index = match mode {
            ExportMode::Incremental => max_page_index(&dir).await?.map_or(1, |max| max + 1),
            ExportMode::FullSnapshot => 1,
        };

        tracing::debug!(
            dir = %dir.display(),
            mode = %mode,
            next_index = next_index,
            "Opened page writer"
        );

        Ok(Self {
            dir,
            next_index,
            files_written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Index the next written page will get
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    /// Write a page as a pretty-printed JSON array of rows
    ///
    /// Returns the written path, or `None` for an empty page, which neither
    /// creates a file nor advances the counter.
    ///
    /// # Errors
    ///
    /// Returns a filesystem error if the directory or file cannot be written.
    pub async fn write(&mut self, page: &Page) -> Result<Option<PathBuf>> {
        if page.is_empty() {
            return Ok(None);
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CubexError::Filesystem(format!("Failed to create {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(page_file_name(self.next_index));
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(&page.rows)?;

        tokio::fs::write(&tmp_path, &json).await.map_err(|e| {
            CubexError::Filesystem(format!("Failed to write {}: {e}", tmp_path.display()))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            CubexError::Filesystem(format!("Failed to replace {}: {e}", path.display()))
        })?;

        tracing::debug!(
            path = %path.display(),
            rows = page.row_count(),
            "Wrote page"
        );

        self.next_index += 1;
        self.files_written += 1;
        Ok(Some(path))
    }

    /// Page files at or beyond the next index, left over from a longer earlier run
    ///
    /// Only meaningful for full snapshots, which rewrite from index 1.
    pub async fn stale_pages(&self) -> Result<u64> {
        Ok(max_page_index(&self.dir)
            .await?
            .map_or(0, |max| (max + 1).saturating_sub(self.next_index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Row;
    use serde_json::json;
    use tempfile::TempDir;
    use test_case::test_case;

    fn page(ids: &[i64]) -> Page {
        Page::new(
            ids.iter()
                .map(|id| {
                    let mut row = Row::new();
                    row.insert("Stores.id".to_string(), json!(id));
                    row
                })
                .collect(),
        )
    }

    #[test_case(1, "0000001.json")]
    #[test_case(42, "0000042.json")]
    #[test_case(1234567, "1234567.json")]
    fn test_page_file_name(index: u64, expected: &str) {
        assert_eq!(page_file_name(index), expected);
    }

    #[test_case("0000007.json", Some(7) ; "padded")]
    #[test_case("12.json", Some(12) ; "short")]
    #[test_case("latest-data-date-time.txt", None ; "checkpoint")]
    #[test_case("0000001.json.tmp", None ; "temporary")]
    #[test_case("notes.json", None ; "non numeric")]
    fn test_page_index(name: &str, expected: Option<u64>) {
        assert_eq!(page_index(Path::new(name)), expected);
    }

    #[tokio::test]
    async fn test_incremental_continues_after_existing() {
        let dir = TempDir::new().unwrap();
        for name in ["0000001.json", "0000005.json", "latest-data-date-time.txt"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }

        let mut writer = PageWriter::open(dir.path(), ExportMode::Incremental)
            .await
            .unwrap();
        assert_eq!(writer.next_index(), 6);

        let path = writer.write(&page(&[1])).await.unwrap().unwrap();
        assert_eq!(path, dir.path().join("0000006.json"));
        assert_eq!(writer.next_index(), 7);
    }

    #[tokio::test]
    async fn test_incremental_missing_dir_starts_at_one() {
        let dir = TempDir::new().unwrap();
        let cube_dir = dir.path().join("Orders");

        let mut writer = PageWriter::open(&cube_dir, ExportMode::Incremental)
            .await
            .unwrap();
        assert_eq!(writer.next_index(), 1);

        writer.write(&page(&[1, 2])).await.unwrap();
        assert!(cube_dir.join("0000001.json").exists());
    }

    #[tokio::test]
    async fn test_full_snapshot_restarts_at_one() {
        let dir = TempDir::new().unwrap();
        for name in ["0000001.json", "0000002.json", "0000003.json"] {
            std::fs::write(dir.path().join(name), "[]").unwrap();
        }

        let mut writer = PageWriter::open(dir.path(), ExportMode::FullSnapshot)
            .await
            .unwrap();
        assert_eq!(writer.next_index(), 1);

        writer.write(&page(&[1])).await.unwrap();
        assert_eq!(writer.stale_pages().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut writer = PageWriter::open(dir.path(), ExportMode::FullSnapshot)
            .await
            .unwrap();

        assert!(writer.write(&Page::default()).await.unwrap().is_none());
        assert_eq!(writer.next_index(), 1);
        assert_eq!(writer.files_written(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_written_content_is_pretty_json_array() {
        let dir = TempDir::new().unwrap();
        let mut writer = PageWriter::open(dir.path(), ExportMode::FullSnapshot)
            .await
            .unwrap();

        let path = writer.write(&page(&[1, 2])).await.unwrap().unwrap();
        let content = std::fs::read_to_string(path).unwrap();

        assert!(content.starts_with("[\n"));
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, json!([{"Stores.id": 1}, {"Stores.id": 2}]));
    }
}
