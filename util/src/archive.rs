//! Struct archiving functionality
//!
//! An [`Archiver`] writes a sequence of serde-serialisable records into a
//! CSV file, one row per record, with the header taken from the record's
//! field names.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::{Path, PathBuf};
use std::fs::File;
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver {
    path: PathBuf,
    writer: Writer<File>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create archive file {0:?}: {1}")]
    CreateError(PathBuf, std::io::Error),

    #[error("Cannot write to archive file {0:?}: {1}")]
    WriteError(PathBuf, csv::Error),

    #[error("Cannot flush archive file {0:?}: {1}")]
    FlushError(PathBuf, std::io::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver at the given path, truncating any existing file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();

        let file = File::create(&path)
            .map_err(|e| ArchiveError::CreateError(path.clone(), e))?;

        let writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self { path, writer })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(|e| ArchiveError::WriteError(self.path.clone(), e))
    }

    /// Serialise every record of an iterator into the archive, then flush.
    pub fn serialise_all<T, I>(&mut self, records: I) -> Result<(), ArchiveError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>
    {
        for record in records {
            self.serialise(record)?;
        }

        self.flush()
    }

    /// Flush buffered rows to disk.
    pub fn flush(&mut self) -> Result<(), ArchiveError> {
        self.writer
            .flush()
            .map_err(|e| ArchiveError::FlushError(self.path.clone(), e))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        time_s: f64,
        rate: f64
    }

    #[test]
    fn test_archive_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.csv");

        let mut arch = Archiver::from_path(&path).unwrap();
        arch.serialise_all(vec![
            Sample { time_s: 0.0, rate: 1.5 },
            Sample { time_s: 0.1, rate: -2.0 },
        ]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "time_s,rate\n0.0,1.5\n0.1,-2.0\n");
    }

    #[test]
    fn test_archive_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("samples.csv");

        match Archiver::from_path(&path) {
            Err(ArchiveError::CreateError(p, _)) => assert_eq!(p, path),
            Err(e) => panic!("Unexpected error {}", e),
            Ok(_) => panic!("Expected archive creation to fail")
        }
    }
}
