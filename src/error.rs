use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input errors. Classification problems are not errors, they end up as a failed `Decision`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid coverage summary {}: {msg}", path.display())]
    Coverage { path: PathBuf, msg: String },

    #[error("Invalid thresholds table {}: {msg}", path.display())]
    Thresholds { path: PathBuf, msg: String },

    #[error("No thresholds found for capture platform '{platform}'")]
    MissingThresholds { platform: String },

    #[error("Division by zero: {what} is 0")]
    DivisionByZero { what: String },

    #[error("{what} is out of range")]
    Overflow { what: String },

    #[error("Invalid sample sheet {}: {msg}", path.display())]
    SampleSheet { path: PathBuf, msg: String },

    #[error("Refusing to overwrite {}, which is not linked to the source (use --force)", destination.display())]
    LinkConflict { destination: PathBuf },

    #[error("Cannot hard link {} to {}, they are on different filesystems", source_path.display(), destination.display())]
    CrossDevice {
        source_path: PathBuf,
        destination: PathBuf,
    },

    #[error("Unable to open {} with its index: {msg}", path.display())]
    Bam { path: PathBuf, msg: String },
}

impl Error {
    #[cold]
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[cold]
    pub fn coverage<P: AsRef<Path>, M: Into<String>>(path: P, msg: M) -> Self {
        Error::Coverage {
            path: path.as_ref().to_path_buf(),
            msg: msg.into(),
        }
    }

    #[cold]
    pub fn thresholds<P: AsRef<Path>, M: Into<String>>(path: P, msg: M) -> Self {
        Error::Thresholds {
            path: path.as_ref().to_path_buf(),
            msg: msg.into(),
        }
    }

    #[cold]
    pub fn sample_sheet<P: AsRef<Path>, M: Into<String>>(path: P, msg: M) -> Self {
        Error::SampleSheet {
            path: path.as_ref().to_path_buf(),
            msg: msg.into(),
        }
    }

    #[cold]
    pub fn division_by_zero<W: Into<String>>(what: W) -> Self {
        Error::DivisionByZero { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
