use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the ledger engine and the note stores around it.
///
/// A section that cannot be located is *not* an error on the read path; only
/// operations that need the section to exist (such as a replace) report
/// [`Error::SectionNotFound`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("section `{0}` not found")]
    SectionNotFound(String),

    #[error("invalid section label: {0}")]
    InvalidLabel(String),

    #[error("note not found: {0}")]
    NoteNotFound(String),

    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config at {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not serialize config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("could not write front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("invalid tag pattern: {0}")]
    TagPattern(#[from] regex::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
