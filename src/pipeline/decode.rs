//! Incremental decoder for concatenated JSON values (Bytes -> T)
//!
//! The server writes one JSON object per line, but nothing here depends on
//! the newlines: values may be separated by any whitespace or none, and may be
//! split across chunks at any byte.

use serde::de::DeserializeOwned;
use serde_json::Deserializer;

/// Byte buffer that yields complete JSON values as they become available.
#[derive(Debug, Default)]
pub struct JsonStreamDecoder {
    buf: Vec<u8>,
    pos: usize,
}

impl JsonStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk read from the body.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes fed but not yet consumed, leading whitespace included.
    pub fn pending(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Next complete value, if the buffer holds one.
    ///
    /// `None` means more input is needed. A value touching the end of the
    /// buffer is held back when it is a bare number, since the next chunk may
    /// extend it.
    pub fn decode_next<T: DeserializeOwned>(&mut self) -> Option<Result<T, serde_json::Error>> {
        self.decode(false)
    }

    /// Like [`decode_next`](Self::decode_next) once the body has ended: any
    /// non-whitespace left over must decode, and a truncated value is an error.
    /// `None` means the input is exhausted.
    pub fn decode_eof<T: DeserializeOwned>(&mut self) -> Option<Result<T, serde_json::Error>> {
        self.decode(true)
    }

    // An incomplete value is re-parsed from its first byte on every call, so a
    // value split over k chunks costs O(len * k). Server lines are small and
    // the task calls this once per chunk.
    fn decode<T: DeserializeOwned>(&mut self, at_eof: bool) -> Option<Result<T, serde_json::Error>> {
        let rest = &self.buf[self.pos..];
        let mut iter = Deserializer::from_slice(rest).into_iter::<T>();
        match iter.next() {
            None => {
                // whitespace only
                self.pos += iter.byte_offset();
                None
            }
            Some(Ok(value)) => {
                let end = iter.byte_offset();
                if !at_eof && end == rest.len() && rest[end - 1].is_ascii_digit() {
                    return None;
                }
                self.pos += end;
                Some(Ok(value))
            }
            Some(Err(e)) if e.is_eof() && !at_eof => None,
            Some(Err(e)) => {
                // poisoned: nothing after a syntax error can be trusted
                self.pos = self.buf.len();
                Some(Err(e))
            }
        }
    }
}
