use crate::error::{CrawlError, Result};
use crate::result::PageRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.csv";
pub const INDEX_HEADER: [&str; 4] = ["id", "url", "title", "txt_file"];

/// Accepted pages in acceptance order, plus their on-disk artifacts.
///
/// Text artifacts are written as each page is accepted; the index is written
/// once by [`ResultStore::write_index`].
#[derive(Debug)]
pub struct ResultStore {
    dir: PathBuf,
    records: Vec<PageRecord>,
}

impl ResultStore {
    /// Creates the output directory if needed. Failure here is a setup error.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CrawlError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            records: Vec::new(),
        })
    }

    /// Persists `text` as the next `page<N>.txt` and records the page.
    ///
    /// Nothing is recorded and no id is consumed if the artifact cannot be
    /// written.
    pub fn accept(
        &mut self,
        url: &str,
        title: String,
        text: String,
        depth: usize,
    ) -> Result<&PageRecord> {
        let id = format!("page{}", self.records.len() + 1);
        let txt_file = format!("{}.txt", id);
        write_atomically(&self.dir.join(&txt_file), text.as_bytes())?;

        self.records.push(PageRecord {
            id,
            url: url.to_string(),
            title,
            text,
            depth,
            txt_file,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Writes `index.csv` with one row per accepted page, header included even
    /// when no page was accepted.
    pub fn write_index(&self) -> Result<PathBuf> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(INDEX_HEADER)?;
        for record in &self.records {
            writer.serialize(record.index_row())?;
        }
        let contents = writer
            .into_inner()
            .map_err(|e| CrawlError::Io(e.into_error()))?;

        let path = self.index_path();
        write_atomically(&path, &contents)?;
        Ok(path)
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PageRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes through a hidden sibling file and renames it into place, so readers
/// never observe a half-written artifact.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "artifact path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
