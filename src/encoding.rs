//! Character encoding support for delimited sources.
//!
//! A [`TextEncoding`] names the on-disk encoding of a source file by WHATWG
//! label; [`DecodeReader`] streams those bytes to the tokenizer as UTF-8.
//! UTF-8 sources bypass the decoder entirely.

use encoding_rs::{CoderResult, Decoder, Encoding};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::{self, Read};

const DECODE_BUF_LEN: usize = 8 * 1024;

/// Character encoding of a source file, resolved from a WHATWG label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    /// UTF-8, the default source encoding.
    pub const UTF_8: TextEncoding = TextEncoding(encoding_rs::UTF_8);

    /// Resolve an encoding from a WHATWG label such as `"windows-1252"`
    /// or `"shift_jis"`. Returns `None` for unknown labels.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(TextEncoding)
    }

    /// Canonical name of this encoding.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.0 == encoding_rs::UTF_8
    }

    fn new_decoder(&self) -> Decoder {
        self.0.new_decoder()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::UTF_8
    }
}

impl Serialize for TextEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TextEncoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        TextEncoding::for_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown encoding label '{label}'")))
    }
}

/// Streaming byte-to-UTF-8 decoder over any [`Read`] source.
///
/// Invalid sequences are replaced with U+FFFD rather than failing, keeping
/// decode problems out of the session's boolean EOF contract.
pub struct DecodeReader<R> {
    inner: R,
    // None for UTF-8 passthrough
    decoder: Option<Decoder>,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
    finished: bool,
}

impl<R: Read> DecodeReader<R> {
    pub fn new(inner: R, encoding: TextEncoding) -> Self {
        let decoder = (!encoding.is_utf8()).then(|| encoding.new_decoder());
        DecodeReader {
            inner,
            decoder,
            buf: vec![0u8; DECODE_BUF_LEN].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
            finished: false,
        }
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let Some(decoder) = self.decoder.as_mut() else {
            return self.inner.read(out);
        };
        if out.is_empty() || self.finished {
            return Ok(0);
        }

        loop {
            if self.start == self.end && !self.eof {
                self.start = 0;
                self.end = self.inner.read(&mut self.buf)?;
                if self.end == 0 {
                    self.eof = true;
                }
            }

            let last = self.eof && self.start == self.end;
            let (result, read, written, _) =
                decoder.decode_to_utf8(&self.buf[self.start..self.end], out, last);
            self.start += read;
            if last && result == CoderResult::InputEmpty {
                self.finished = true;
            }
            if written > 0 || self.finished {
                return Ok(written);
            }
            if result == CoderResult::OutputFull {
                // Only reachable when `out` cannot hold a single scalar;
                // surface the misuse instead of looking like EOF.
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "output buffer too small for a single decoded scalar",
                ));
            }
        }
    }
}
