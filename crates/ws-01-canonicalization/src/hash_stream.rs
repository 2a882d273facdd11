//! # Hash Stream
//!
//! A write-only [`Write`] sink that feeds every byte into a digest or MAC.
//! The hash is borrowed from the caller and never owned by the stream.
//!
//! When diagnostics are enabled the stream also keeps a copy of the
//! canonical bytes, and emits them with any caller-supplied pre-canonical
//! bytes on a `trace` event when the hash is flushed. The digest depends
//! only on the bytes written.

use shared_crypto::IncrementalHash;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Tracing target for digest diagnostics.
pub const DIGEST_TRACE_TARGET: &str = "ws_sec::digest";

pub struct HashStream<'h> {
    hash: &'h mut dyn IncrementalHash,
    log: Option<Vec<u8>>,
    length: u64,
    value: Option<Vec<u8>>,
}

impl<'h> HashStream<'h> {
    pub fn new(hash: &'h mut dyn IncrementalHash) -> Self {
        Self {
            hash,
            log: None,
            length: 0,
            value: None,
        }
    }

    /// Stream that also buffers canonical bytes for the digest trace.
    pub fn with_diagnostics(hash: &'h mut dyn IncrementalHash) -> Self {
        Self {
            log: Some(Vec::new()),
            ..Self::new(hash)
        }
    }

    pub fn can_read(&self) -> bool {
        false
    }

    pub fn can_seek(&self) -> bool {
        false
    }

    /// False once the hash is finalized.
    pub fn can_write(&self) -> bool {
        self.value.is_none()
    }

    /// Bytes written since the last reset.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Feed `count` bytes of `buffer` starting at `offset`.
    pub fn write_range(&mut self, buffer: &[u8], offset: usize, count: usize) -> io::Result<()> {
        let end = offset.checked_add(count).filter(|end| *end <= buffer.len());
        match end {
            Some(end) => self.write_all(&buffer[offset..end]),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "range {offset}+{count} outside buffer of {} bytes",
                    buffer.len()
                ),
            )),
        }
    }

    /// Finalize the hash. Further writes fail until [`reset`](Self::reset).
    ///
    /// `pre_canonical` is the input the canonical bytes were produced from;
    /// it is only reported on the digest trace.
    pub fn flush_hash(&mut self, pre_canonical: Option<&[u8]>) {
        if self.value.is_some() {
            return;
        }
        let value = self.hash.finalize_reset();

        debug!(
            algorithm = self.hash.algorithm_uri(),
            length = self.length,
            "hash stream finalized"
        );
        if let Some(log) = &self.log {
            trace!(
                target: DIGEST_TRACE_TARGET,
                algorithm = self.hash.algorithm_uri(),
                digest = %hex::encode(&value),
                canonical = %String::from_utf8_lossy(log),
                pre_canonical = %pre_canonical.map(String::from_utf8_lossy).unwrap_or_default(),
                "digest computed"
            );
        }
        self.value = Some(value);
    }

    /// Finalize and return the hash value.
    pub fn flush_hash_and_get_value(&mut self, pre_canonical: Option<&[u8]>) -> Vec<u8> {
        self.flush_hash(pre_canonical);
        self.value.clone().unwrap_or_default()
    }

    /// Rebind to a new hash, dropping buffered diagnostics and any
    /// finalized value. A partial computation is discarded from the old
    /// hash; the new one is used as the caller hands it over.
    pub fn reset(&mut self, hash: &'h mut dyn IncrementalHash) {
        self.reset_in_place();
        self.hash = hash;
    }

    /// Keep the current hash and start a fresh computation.
    pub fn reset_in_place(&mut self) {
        if self.value.take().is_none() && self.length > 0 {
            // Discard a partial computation.
            let _ = self.hash.finalize_reset();
        }
        self.length = 0;
        if let Some(log) = self.log.as_mut() {
            log.clear();
        }
    }
}

impl Write for HashStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.value.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "hash stream finalized; reset before writing",
            ));
        }
        self.hash.update(buf);
        if let Some(log) = self.log.as_mut() {
            log.extend_from_slice(buf);
        }
        self.length += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for HashStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashStream")
            .field("algorithm", &self.hash.algorithm_uri())
            .field("length", &self.length)
            .field("finalized", &self.value.is_some())
            .finish()
    }
}
