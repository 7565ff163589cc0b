//! Output sink traits and types

use crate::crawler::Article;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize article: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for harvested articles
pub trait RecordSink {
    /// Stores one article
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the article in the run, starting at 0
    /// * `article` - The article to store
    fn write(&mut self, index: usize, article: &Article) -> OutputResult<()>;

    /// Flushes anything buffered; called once the run is over
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write(&mut self, index: usize, article: &Article) -> OutputResult<()> {
        (**self).write(index, article)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}

/// Keeps articles in memory
impl RecordSink for Vec<Article> {
    fn write(&mut self, _index: usize, article: &Article) -> OutputResult<()> {
        self.push(article.clone());
        Ok(())
    }
}
