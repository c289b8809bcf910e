//! Mode-locked record reader for delimited text files.
//!
//! `rowlock` wraps the csv tokenizer in a session abstraction with two
//! mutually exclusive consumption modes over one shared cursor:
//!
//! - **Raw fields**: each record as an ordered `Vec<String>`
//! - **Typed records**: each record bound to a caller type via serde
//!
//! The first successful record pull locks the session to that family; the
//! other family then fails as a no-op until the session is closed and
//! reopened. Every operation degrades to `false`, an empty sequence, or
//! `None` — nothing panics and nothing is fatal.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rowlock::RecordSource;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Person {
//!     id: String,
//!     name: String,
//! }
//!
//! let mut source = RecordSource::with_path("people.csv");
//!
//! // Typed drain (locks the session to typed records)
//! for person in source.all_typed::<Person>() {
//!     println!("{} -> {}", person.id, person.name);
//! }
//!
//! // Raw drain over a fresh pass
//! for fields in source.all_raw() {
//!     println!("{fields:?}");
//! }
//! ```

mod config;
mod cursor;
mod encoding;
mod error;
mod source;
mod tokenizer;

pub use config::SourceConfig;
pub use cursor::{AccessMode, Cursor};
pub use encoding::{DecodeReader, TextEncoding};
pub use error::{Result, SourceError};
pub use source::{AllRaw, AllTyped, RecordSource};
pub use tokenizer::Tokenizer;
