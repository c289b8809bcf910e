//! Tokenizer boundary over the `csv` crate.
//!
//! A [`Tokenizer`] binds one character stream to the csv parser for the
//! lifetime of a session. It deliberately runs with header handling
//! disabled in the underlying reader: consuming and binding the header row
//! is the session state machine's job, so the tokenizer exposes it as an
//! explicit step instead.

use crate::config::SourceConfig;
use crate::encoding::DecodeReader;
use crate::error::{Result, SourceError};
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::fs::File;
use tracing::warn;

/// Handle binding one open stream to the csv tokenizer.
pub struct Tokenizer {
    reader: csv::Reader<DecodeReader<File>>,
    record: StringRecord,
    header: Option<StringRecord>,
}

impl Tokenizer {
    /// Bind a tokenizer to the configured file.
    ///
    /// Opens the file, stacks the encoding decoder on top, and builds the
    /// csv reader with the configured delimiter. Any failure releases the
    /// partially acquired resources before returning.
    pub fn bind(config: &SourceConfig) -> Result<Self> {
        let file = File::open(&config.path)
            .map_err(|e| SourceError::file_error(config.path.clone(), e))?;
        if config.delimiter.len() > 1 {
            warn!(delimiter = %config.delimiter, "multi-byte delimiter truncated to first byte");
        }
        let reader = ReaderBuilder::new()
            .delimiter(config.delimiter_byte())
            .has_headers(false)
            .flexible(true)
            .from_reader(DecodeReader::new(file, config.encoding));
        Ok(Tokenizer { reader, record: StringRecord::new(), header: None })
    }

    /// Read one line into the buffered record. `Ok(false)` signals EOF, in
    /// which case the buffered record is left empty.
    pub fn read_line(&mut self) -> Result<bool> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| SourceError::tokenizer_error("record read", e))?;
        Ok(more)
    }

    /// Consume one line and bind it as the header-row mapping for named
    /// lookups. `Ok(false)` signals EOF before any header line.
    pub fn read_header(&mut self) -> Result<bool> {
        let mut header = StringRecord::new();
        let more = self
            .reader
            .read_record(&mut header)
            .map_err(|e| SourceError::tokenizer_error("header read", e))?;
        if more {
            self.header = Some(header);
        }
        Ok(more)
    }

    /// Consume and discard one line without touching the buffered record.
    pub fn skip_line(&mut self) -> Result<bool> {
        let mut sink = StringRecord::new();
        self.reader
            .read_record(&mut sink)
            .map_err(|e| SourceError::tokenizer_error("line skip", e))
    }

    /// The buffered record; empty when nothing has been read or EOF was hit.
    pub fn current(&self) -> &StringRecord {
        &self.record
    }

    /// Fields of the buffered record as owned strings.
    pub fn current_fields(&self) -> Vec<String> {
        self.current().iter().map(str::to_string).collect()
    }

    /// The bound header-row mapping, if [`read_header`](Self::read_header)
    /// has succeeded.
    pub fn header(&self) -> Option<&StringRecord> {
        self.header.as_ref()
    }

    /// Bind the buffered record to `T`.
    ///
    /// Mapping is by column name when a header mapping is bound, by field
    /// position otherwise. serde-skipped fields are ignored either way.
    pub fn bind_current<T: DeserializeOwned>(&self) -> Result<T> {
        self.record
            .deserialize(self.header())
            .map_err(|e| SourceError::bind_error(e.to_string()))
    }
}
