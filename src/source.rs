//! Mode-locked record session over a delimited file.
//!
//! [`RecordSource`] owns the open/closed lifecycle of one delimited-file
//! session and shares a single tokenizer cursor between two mutually
//! exclusive access patterns: raw ordered string fields and typed record
//! binding. The first successful record pull locks the session to that
//! family; the opposite family then fails as a no-op until the session is
//! closed and reopened.
//!
//! Every operation degrades to `false`, an empty sequence, or `None`
//! instead of returning an error: end-of-stream and failure are signalled
//! identically through the boolean contract, by design.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rowlock::RecordSource;
//!
//! let mut source = RecordSource::with_path("people.csv");
//! if source.open() {
//!     while source.advance_raw() {
//!         println!("{:?}", source.current_raw());
//!     }
//!     source.close(false);
//! }
//! ```

use crate::config::SourceConfig;
use crate::cursor::{AccessMode, Cursor};
use crate::tokenizer::Tokenizer;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One delimited-file session: lifecycle, mode lock, and shared cursor.
pub struct RecordSource {
    config: SourceConfig,
    tokenizer: Option<Tokenizer>,
    mode: AccessMode,
    cursor: Cursor,
    raw_consumed: bool,
    typed_consumed: bool,
}

impl RecordSource {
    /// Create a closed session over the given configuration.
    pub fn new(config: SourceConfig) -> Self {
        RecordSource {
            config,
            tokenizer: None,
            mode: AccessMode::Unset,
            cursor: Cursor::Disabled,
            raw_consumed: false,
            typed_consumed: false,
        }
    }

    /// Create a closed session with default settings over `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        RecordSource::new(SourceConfig::for_path(path))
    }

    /// Create a session over `path` and eagerly open it.
    ///
    /// Returns `None` when the open fails, mirroring the boolean contract
    /// of [`open`](Self::open).
    pub fn open_path(path: impl Into<PathBuf>) -> Option<Self> {
        let mut source = RecordSource::with_path(path);
        source.open().then_some(source)
    }

    /// Session configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Mutable configuration access, granted only while the session is
    /// closed.
    pub fn config_mut(&mut self) -> Option<&mut SourceConfig> {
        if self.is_open() { None } else { Some(&mut self.config) }
    }

    /// True iff a non-empty target path is configured and present on disk
    /// at call time. Does not require the session to be open.
    pub fn exists(&self) -> bool {
        self.config.exists()
    }

    /// Whether a tokenizer handle is currently bound.
    pub fn is_open(&self) -> bool {
        self.tokenizer.is_some()
    }

    /// Whether the locked mode family has pulled at least one record in
    /// this session.
    pub fn has_read(&self) -> bool {
        match self.mode {
            AccessMode::RawFields => self.raw_consumed,
            AccessMode::TypedRecord => self.typed_consumed,
            AccessMode::Unset => false,
        }
    }

    /// Accessor family this session is locked to.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Open the session: close any prior one, then bind a fresh stream and
    /// tokenizer to the configured target.
    ///
    /// Missing target, stream open failure, and tokenizer construction
    /// failure all collapse to `false` with the cursor forced to
    /// [`Cursor::Disabled`] and no resources left behind. The mode lock
    /// field survives; reopening still renegotiates the mode because the
    /// consumed flags are cleared.
    pub fn open(&mut self) -> bool {
        self.close(false);

        if !self.exists() {
            debug!(path = %self.config.path.display(), "open refused, target missing");
            return false;
        }

        match Tokenizer::bind(&self.config) {
            Ok(tokenizer) => {
                self.tokenizer = Some(tokenizer);
                info!(path = %self.config.path.display(), "record source opened");
                true
            }
            Err(err) => {
                self.tokenizer = None;
                self.cursor = Cursor::Disabled;
                warn!(path = %self.config.path.display(), error = %err, "open failed");
                false
            }
        }
    }

    /// Replace the session configuration and open with it.
    pub fn open_with(&mut self, config: SourceConfig) -> bool {
        self.close(false);
        self.config = config;
        self.open()
    }

    /// Close the session. Always safe, including when already closed.
    ///
    /// Releases the stream and tokenizer, resets the cursor and consumed
    /// flags. With `release_all`, additionally clears the mode lock field
    /// (the full-dispose path).
    pub fn close(&mut self, release_all: bool) {
        self.raw_consumed = false;
        self.typed_consumed = false;
        self.cursor = Cursor::Disabled;
        if self.tokenizer.take().is_some() {
            debug!(path = %self.config.path.display(), "record source closed");
        }
        if release_all {
            self.mode = AccessMode::Unset;
        }
    }

    /// Count every data record by privately opening, draining the raw
    /// family, and closing again. The caller's configuration survives.
    ///
    /// Reuses the single shared cursor, so it must not run while another
    /// consumer is mid-stream on this session. Returns -1 when the open
    /// fails.
    pub fn total_record_count(&mut self) -> i64 {
        if !self.open() {
            return Cursor::Disabled.as_i64();
        }
        let mut count = 0i64;
        while self.advance_raw() {
            count += 1;
        }
        self.close(false);
        count
    }

    /// Advance the cursor by one raw record.
    ///
    /// Returns `false` when no tokenizer is bound, when the session is
    /// locked to typed records with at least one consumed, or at
    /// end-of-stream. With a header configured, the first call consumes
    /// and discards the header line before any data row is counted; if
    /// that consumption hits EOF the cursor stays [`Cursor::Disabled`] and
    /// the mode is left unlocked.
    pub fn advance_raw(&mut self) -> bool {
        let Some(tokenizer) = self.tokenizer.as_mut() else {
            return false;
        };
        // Cross-mode contamination guard
        if self.mode == AccessMode::TypedRecord && self.typed_consumed {
            return false;
        }

        if self.config.has_header && self.cursor == Cursor::Disabled {
            match tokenizer.skip_line() {
                Ok(true) => self.cursor = Cursor::HeadOrNoRecord,
                Ok(false) => return false,
                Err(err) => {
                    debug!(error = %err, "header skip failed");
                    return false;
                }
            }
        }

        match tokenizer.read_line() {
            Ok(true) => {
                self.mode = AccessMode::RawFields;
                self.raw_consumed = true;
                self.cursor = self.cursor.advanced();
                true
            }
            Ok(false) => false,
            Err(err) => {
                debug!(error = %err, "raw advance failed");
                false
            }
        }
    }

    /// Advance the cursor by one typed record.
    ///
    /// Symmetric to [`advance_raw`](Self::advance_raw) with the reverse
    /// contamination guard. Header handling differs: the header line is
    /// read and bound as the header-row mapping so later named binds
    /// resolve columns.
    pub fn advance_typed(&mut self) -> bool {
        let Some(tokenizer) = self.tokenizer.as_mut() else {
            return false;
        };
        if self.mode == AccessMode::RawFields && self.raw_consumed {
            return false;
        }

        if self.config.has_header && self.cursor == Cursor::Disabled {
            match tokenizer.read_header() {
                Ok(true) => self.cursor = Cursor::HeadOrNoRecord,
                Ok(false) => return false,
                Err(err) => {
                    debug!(error = %err, "header bind failed");
                    return false;
                }
            }
        }

        match tokenizer.read_line() {
            Ok(true) => {
                self.mode = AccessMode::TypedRecord;
                self.typed_consumed = true;
                self.cursor = self.cursor.advanced();
                true
            }
            Ok(false) => false,
            Err(err) => {
                debug!(error = %err, "typed advance failed");
                false
            }
        }
    }

    /// Ordered field sequence of the record at the cursor.
    ///
    /// Performs exactly one implicit [`advance_raw`](Self::advance_raw) if
    /// no raw record has been pulled yet this session. Returns an empty
    /// sequence when nothing is buffered (closed session, contamination,
    /// or exhausted stream): empty means nothing here.
    pub fn current_raw(&mut self) -> Vec<String> {
        if self.tokenizer.is_none() {
            return Vec::new();
        }
        if !self.raw_consumed && !self.advance_raw() {
            return Vec::new();
        }
        self.tokenizer.as_ref().map(Tokenizer::current_fields).unwrap_or_default()
    }

    /// The record at the cursor bound to `T`.
    ///
    /// Performs exactly one implicit [`advance_typed`](Self::advance_typed)
    /// if no typed record has been pulled yet this session. Returns `None`
    /// when no tokenizer is bound or the bind fails.
    pub fn current_typed<T: DeserializeOwned>(&mut self) -> Option<T> {
        self.tokenizer.as_ref()?;
        if !self.typed_consumed && !self.advance_typed() {
            return None;
        }
        match self.tokenizer.as_ref()?.bind_current() {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(error = %err, "typed bind failed");
                None
            }
        }
    }

    /// Lazy, single-pass, non-restartable sequence of raw records.
    ///
    /// Performs its own private [`open`](Self::open) when first consumed
    /// and yields field sequences until EOF. The session is left open once
    /// the sequence is exhausted or abandoned; releasing it is the
    /// caller's responsibility.
    pub fn all_raw(&mut self) -> AllRaw<'_> {
        AllRaw { source: self, opened: false, done: false }
    }

    /// Lazy, single-pass, non-restartable sequence of typed records.
    ///
    /// Performs its own private [`open`](Self::open) when first consumed.
    /// Participates in the same mode lock as the per-record accessors: a
    /// session already locked to raw fields yields an empty sequence.
    pub fn all_typed<T: DeserializeOwned>(&mut self) -> AllTyped<'_, T> {
        AllTyped { source: self, opened: false, done: false, _marker: PhantomData }
    }
}

impl Drop for RecordSource {
    fn drop(&mut self) {
        // Dispose path: release everything, never panic
        self.close(true);
    }
}

/// Iterator over every raw record of a freshly opened session.
///
/// Produced by [`RecordSource::all_raw`].
pub struct AllRaw<'a> {
    source: &'a mut RecordSource,
    opened: bool,
    done: bool,
}

impl Iterator for AllRaw<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        if self.done {
            return None;
        }
        if !self.opened {
            self.opened = true;
            if !self.source.open() {
                self.done = true;
                return None;
            }
        }
        if self.source.advance_raw() {
            Some(self.source.current_raw())
        } else {
            self.done = true;
            None
        }
    }
}

/// Iterator over every typed record of a freshly opened session.
///
/// Produced by [`RecordSource::all_typed`].
pub struct AllTyped<'a, T> {
    source: &'a mut RecordSource,
    opened: bool,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Iterator for AllTyped<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }
        if !self.opened {
            self.opened = true;
            if !self.source.open() {
                self.done = true;
                return None;
            }
        }
        if !self.source.advance_typed() {
            self.done = true;
            return None;
        }
        match self.source.current_typed::<T>() {
            Some(value) => Some(value),
            None => {
                self.done = true;
                None
            }
        }
    }
}
