//! # Canonical Form Writer
//!
//! Final byte-emission stage for an already canonical character sequence.
//! Output is UTF-8 without a byte-order mark. Nothing is escaped or
//! reordered here.
//!
//! Text that is entirely ASCII (every char below 0x7F) is copied through a
//! reusable work buffer and written in one call. Anything else is encoded
//! as full UTF-8. Both paths produce identical bytes for the same input.

use std::io::{self, Write};

/// Initial work buffer capacity.
const WORK_BUFFER_SIZE: usize = 512;

/// Reusable canonical byte emitter. One per call chain; not shared.
#[derive(Debug)]
pub struct CanonicalFormWriter {
    work: Vec<u8>,
}

impl Default for CanonicalFormWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalFormWriter {
    pub fn new() -> Self {
        Self {
            work: Vec::with_capacity(WORK_BUFFER_SIZE),
        }
    }

    /// Write `text` as canonical UTF-8.
    pub fn encode_and_write<W: Write + ?Sized>(
        &mut self,
        stream: &mut W,
        text: &str,
    ) -> io::Result<()> {
        if self.fill_ascii(text.chars()) {
            stream.write_all(&self.work)
        } else {
            stream.write_all(text.as_bytes())
        }
    }

    /// Write the first `count` characters of `chars` as canonical UTF-8.
    pub fn encode_and_write_chars<W: Write + ?Sized>(
        &mut self,
        stream: &mut W,
        chars: &[char],
        count: usize,
    ) -> io::Result<()> {
        let chars = chars.get(..count).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("count {count} exceeds {} available characters", chars.len()),
            )
        })?;

        if self.fill_ascii(chars.iter().copied()) {
            return stream.write_all(&self.work);
        }

        self.work.clear();
        let mut scratch = [0u8; 4];
        for c in chars {
            self.work
                .extend_from_slice(c.encode_utf8(&mut scratch).as_bytes());
        }
        stream.write_all(&self.work)
    }

    /// Copy chars into the work buffer while they stay ASCII. Returns false
    /// at the first char that is not.
    fn fill_ascii(&mut self, chars: impl Iterator<Item = char>) -> bool {
        self.work.clear();
        for c in chars {
            if (c as u32) >= 0x7F {
                return false;
            }
            self.work.push(c as u8);
        }
        true
    }
}
