//! Cursor and access-mode states for a record session.

use serde::{Deserialize, Serialize};

/// Position of a session's shared record cursor.
///
/// The header row, when present, is never counted: `Available(n)` means
/// exactly `n` data records have been consumed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    /// Not open, failed open, or closed.
    #[default]
    Disabled,

    /// Open with the header (if any) consumed, but no data record yet.
    HeadOrNoRecord,

    /// N data records consumed so far.
    Available(u64),
}

impl Cursor {
    /// Interop status code: `Disabled` = -1, `HeadOrNoRecord` = 0,
    /// `Available(n)` = n.
    pub fn as_i64(self) -> i64 {
        match self {
            Cursor::Disabled => -1,
            Cursor::HeadOrNoRecord => 0,
            Cursor::Available(n) => n as i64,
        }
    }

    /// Number of data records consumed so far.
    pub fn records_consumed(self) -> u64 {
        match self {
            Cursor::Available(n) => n,
            _ => 0,
        }
    }

    /// Cursor position after one successful record pull.
    pub(crate) fn advanced(self) -> Self {
        match self {
            Cursor::Disabled | Cursor::HeadOrNoRecord => Cursor::Available(1),
            Cursor::Available(n) => Cursor::Available(n + 1),
        }
    }
}

/// Accessor family a session is locked to.
///
/// First-write-wins: the first successful record pull fixes the mode, and
/// the opposite family fails as a no-op until the session is reopened with
/// cleared consumed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// No record pulled yet; either family may claim the session.
    #[default]
    Unset,

    /// Locked to ordered string-field records.
    RawFields,

    /// Locked to typed record binding.
    TypedRecord,
}
