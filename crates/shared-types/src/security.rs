//! # Security Utilities
//!
//! Small helpers shared by the canonicalization, identity and signature
//! crates: buffer cloning and matching, unique-id generation and
//! certificate-id formatting.
//!
//! ## Security Properties
//!
//! - **Constant-Time Matching**: digest and MAC comparisons go through
//!   [`match_buffers`], which never short-circuits on the first difference
//! - **Bounds-Checked Ranges**: range helpers return errors instead of panicking

use crate::errors::SecurityError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;
use uuid::Uuid;

// =============================================================================
// BUFFERS
// =============================================================================

/// Copy `count` bytes starting at `offset` into a new buffer.
pub fn clone_buffer_range(
    buffer: &[u8],
    offset: usize,
    count: usize,
) -> Result<Vec<u8>, SecurityError> {
    Ok(checked_range(buffer, offset, count)?.to_vec())
}

/// Compares two buffers in constant time with respect to their contents.
///
/// Buffers of different length never match; the length itself is not
/// treated as secret.
pub fn match_buffers(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Compares `count` bytes of `a` at `a_offset` with `b` at `b_offset`.
pub fn match_buffer_ranges(
    a: &[u8],
    a_offset: usize,
    b: &[u8],
    b_offset: usize,
    count: usize,
) -> Result<bool, SecurityError> {
    let left = checked_range(a, a_offset, count)?;
    let right = checked_range(b, b_offset, count)?;
    Ok(match_buffers(left, right))
}

fn checked_range(buffer: &[u8], offset: usize, count: usize) -> Result<&[u8], SecurityError> {
    offset
        .checked_add(count)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            SecurityError::Io(format!(
                "range {offset}+{count} outside buffer of length {}",
                buffer.len()
            ))
        })
}

// =============================================================================
// UNIQUE IDS
// =============================================================================

static ID_PREFIX: OnceLock<String> = OnceLock::new();
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a process-unique id of the form `uuid-<guid>-<n>`.
///
/// The guid is drawn once per process; the suffix is a monotonically
/// increasing counter, so ids are cheap and never repeat.
pub fn generate_unique_id() -> String {
    let prefix = ID_PREFIX.get_or_init(|| format!("uuid-{}-", Uuid::new_v4()));
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}{n}")
}

/// Generates an id suitable for a `wsu:Id` attribute.
///
/// XML ids must start with a letter or underscore, so the unique id is
/// prefixed with `_`.
pub fn generate_xml_id() -> String {
    format!("_{}", generate_unique_id())
}

// =============================================================================
// CERTIFICATE IDS
// =============================================================================

/// Formats a certificate thumbprint as uppercase hex.
pub fn format_certificate_id(thumbprint: &[u8]) -> String {
    hex::encode_upper(thumbprint)
}
