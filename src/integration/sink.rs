//! Trait for trajectory output destinations, plus the file-backed default.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("trajectory sink is not open")]
    NotOpen,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Destination for serialized trajectory data.
///
/// The pipeline opens the sink when a recording session starts, writes the
/// whole serialized buffer on flush, and closes the sink afterwards. One
/// open/close cycle corresponds to one recorded session.
pub trait TrajectorySink {
    /// Error type for persistence failures.
    type Error;

    /// Prepare the destination for a new session, discarding any previous
    /// content.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Append serialized bytes to the open destination.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Finish the session, flushing buffered bytes.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// [`TrajectorySink`] writing each session to the same file path, truncating
/// on open.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrajectorySink for FileSink {
    type Error = SinkError;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.file = Some(BufWriter::new(File::create(&self.path)?));
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let file = self.file.as_mut().ok_or(SinkError::NotOpen)?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let mut file = self.file.take().ok_or(SinkError::NotOpen)?;
        file.flush()?;
        Ok(())
    }
}
