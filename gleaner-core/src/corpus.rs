// Read side of a crawl's output directory: the index joined with the text
// artifacts it points at, as a downstream analysis step would consume them.

use gleaner_scanner::IndexRow;
use gleaner_scanner::store::{INDEX_FILE, INDEX_HEADER};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("cannot read index {path}: {source}")]
    Index {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("index header is {found:?}, expected {expected:?}")]
    Header {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("row {row}: expected id {expected}, found {found}")]
    OutOfOrder {
        row: usize,
        expected: String,
        found: String,
    },

    #[error("row {row}: text file {txt_file:?} escapes the output directory")]
    UnsafePath { row: usize, txt_file: String },

    #[error("{id}: cannot read {path}: {source}")]
    MissingText {
        id: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{id}: text file {path} is empty")]
    EmptyText { id: String, path: PathBuf },
}

/// One accepted page as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub row: IndexRow,
    pub text: String,
}

/// Loads every document listed in `dir/index.csv`, in index order.
///
/// Fails on the first inconsistency: wrong header, ids not `page1..pageN`
/// in order, a `txt_file` pointing outside `dir`, or a missing or empty text
/// file.
pub fn load_corpus(dir: &Path) -> Result<Vec<CorpusDocument>, CorpusError> {
    let index_path = dir.join(INDEX_FILE);
    let index_err = |source| CorpusError::Index {
        path: index_path.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&index_path)
        .map_err(index_err)?;

    let header = reader.headers().map_err(index_err)?;
    if header.iter().ne(INDEX_HEADER) {
        return Err(CorpusError::Header {
            found: header.iter().map(str::to_string).collect(),
            expected: INDEX_HEADER.iter().map(|s| s.to_string()).collect(),
        });
    }

    let mut documents = Vec::new();
    for (position, row) in reader.deserialize::<IndexRow>().enumerate() {
        let row = row.map_err(index_err)?;
        let line = position + 1;

        let expected = format!("page{}", line);
        if row.id != expected {
            return Err(CorpusError::OutOfOrder {
                row: line,
                expected,
                found: row.id,
            });
        }
        if !is_contained(&row.txt_file) {
            return Err(CorpusError::UnsafePath {
                row: line,
                txt_file: row.txt_file,
            });
        }

        let path = dir.join(&row.txt_file);
        let text = fs::read_to_string(&path).map_err(|source| CorpusError::MissingText {
            id: row.id.clone(),
            path: path.clone(),
            source,
        })?;
        if text.trim().is_empty() {
            return Err(CorpusError::EmptyText { id: row.id, path });
        }

        documents.push(CorpusDocument { row, text });
    }

    Ok(documents)
}

/// Relative path made only of normal components.
fn is_contained(txt_file: &str) -> bool {
    let path = Path::new(txt_file);
    !txt_file.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
