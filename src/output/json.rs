//! One JSON file per article

use crate::crawler::Article;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes each article to `<directory>/<index>.json`
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    directory: PathBuf,
    written: usize,
}

impl JsonDirectory {
    /// Creates the directory if needed
    ///
    /// # Returns
    ///
    /// * `Ok(JsonDirectory)` - The directory exists and is a directory
    /// * `Err(OutputError)` - It could not be created, or a file is in the way
    pub fn create(directory: impl AsRef<Path>) -> OutputResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;

        if !directory.is_dir() {
            return Err(OutputError::Write(format!(
                "{} is not a directory",
                directory.display()
            )));
        }

        Ok(Self {
            directory,
            written: 0,
        })
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.directory.join(format!("{}.json", index))
    }

    /// Number of articles written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl RecordSink for JsonDirectory {
    fn write(&mut self, index: usize, article: &Article) -> OutputResult<()> {
        let path = self.path_for(index);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, article)?;
        writer.flush()?;

        tracing::debug!("Wrote article {} to {}", index, path.display());
        self.written += 1;
        Ok(())
    }
}
