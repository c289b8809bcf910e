//! Session configuration for a delimited source.

use crate::encoding::TextEncoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one delimited-file session.
///
/// All fields are mutable only while the session is closed; an open
/// [`RecordSource`](crate::RecordSource) refuses mutable access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Target file path. An empty path never exists.
    pub path: PathBuf,

    /// Source character encoding. Default UTF-8.
    pub encoding: TextEncoding,

    /// Whether the first line is a header row. Default true.
    pub has_header: bool,

    /// Field delimiter. Default `","`. The tokenizer consumes the first
    /// byte; longer delimiters are truncated with a warning.
    pub delimiter: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: PathBuf::new(),
            encoding: TextEncoding::UTF_8,
            has_header: true,
            delimiter: ",".to_string(),
        }
    }
}

impl SourceConfig {
    /// Default configuration over the given path.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        SourceConfig { path: path.into(), ..SourceConfig::default() }
    }

    /// True iff a non-empty path is configured and present on disk right now.
    pub fn exists(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.exists()
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}
