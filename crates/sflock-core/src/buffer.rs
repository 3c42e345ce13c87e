//! Bounded secret accumulator
//!
//! The buffer is the only place the typed passphrase ever lives. Its storage
//! is a single allocation made up front, locked into RAM where the platform
//! allows, and zeroed whenever bytes leave it.

use std::fmt;

use tracing::debug;
use zeroize::Zeroize;

use crate::error::InsertRejected;

/// Default capacity in bytes
pub const DEFAULT_CAPACITY: usize = 255;

/// Fixed-capacity passphrase buffer
pub struct SecretBuffer {
    /// Backing storage; never reallocated
    bytes: Box<[u8]>,
    /// Number of bytes in use
    len: usize,
    /// Whether `bytes` is currently mlock'ed
    locked: bool,
}

impl SecretBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        let bytes = vec![0u8; capacity].into_boxed_slice();
        let locked = memory::lock(&bytes);
        if !locked && capacity > 0 {
            debug!(capacity, "secret buffer could not be locked into memory");
        }

        Self {
            bytes,
            len: 0,
            locked,
        }
    }

    /// Maximum number of bytes the buffer accepts
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `input`.
    ///
    /// Rejected when `input` holds nothing but control characters or when it
    /// would push the length past capacity. A rejected insert leaves the
    /// buffer untouched.
    pub fn insert(&mut self, input: &[u8]) -> Result<(), InsertRejected> {
        if is_control_only(input) {
            return Err(InsertRejected::ControlOnly);
        }

        let end = self
            .len
            .checked_add(input.len())
            .filter(|&end| end <= self.capacity())
            .ok_or(InsertRejected::Overflow {
                len: self.len,
                requested: input.len(),
                capacity: self.capacity(),
            })?;

        self.bytes[self.len..end].copy_from_slice(input);
        self.len = end;
        Ok(())
    }

    /// Remove the most recently entered character.
    ///
    /// Returns `false` (and does nothing) when the buffer is already empty.
    pub fn delete_last(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }

        let start = last_unit_start(&self.bytes[..self.len]);
        self.bytes[start..self.len].zeroize();
        self.len = start;
        true
    }

    /// Zero the used prefix and reset the length
    pub fn clear(&mut self) {
        self.bytes[..self.len].zeroize();
        self.len = 0;
    }

    /// Number of mask glyphs to render. Content never leaves through here.
    pub fn snapshot_for_display(&self) -> usize {
        self.len
    }

    /// Borrow the accumulated bytes for a single verification.
    ///
    /// The caller clears the buffer once the verifier returns.
    pub fn commit(&self) -> SecretView<'_> {
        SecretView {
            bytes: &self.bytes[..self.len],
        }
    }
}

impl Default for SecretBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.bytes.as_mut().zeroize();
        self.len = 0;
        if self.locked {
            memory::unlock(&self.bytes);
        }
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

/// Read-only view of the committed secret
#[derive(Clone, Copy)]
pub struct SecretView<'a> {
    bytes: &'a [u8],
}

impl<'a> SecretView<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SecretView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretView([REDACTED; {}])", self.bytes.len())
    }
}

fn is_control_only(input: &[u8]) -> bool {
    match std::str::from_utf8(input) {
        Ok(text) => text.chars().all(char::is_control),
        Err(_) => input.iter().all(u8::is_ascii_control),
    }
}

/// Start index of the last character in `bytes` (non-empty).
///
/// A well-formed trailing UTF-8 sequence is removed whole; anything else
/// is removed one byte at a time.
fn last_unit_start(bytes: &[u8]) -> usize {
    let last = bytes.len() - 1;
    let floor = last.saturating_sub(3);

    (floor..=last)
        .rev()
        .find(|&i| bytes[i] & 0xC0 != 0x80)
        .filter(|&i| std::str::from_utf8(&bytes[i..]).is_ok())
        .unwrap_or(last)
}

#[cfg(unix)]
mod memory {
    pub(super) fn lock(region: &[u8]) -> bool {
        if region.is_empty() {
            return false;
        }
        // SAFETY: `region` is a live allocation for the duration of the call.
        unsafe { libc::mlock(region.as_ptr().cast(), region.len()) == 0 }
    }

    pub(super) fn unlock(region: &[u8]) {
        // SAFETY: same region that was passed to `lock`.
        unsafe { libc::munlock(region.as_ptr().cast(), region.len()) };
    }
}

#[cfg(not(unix))]
mod memory {
    pub(super) fn lock(_region: &[u8]) -> bool {
        false
    }

    pub(super) fn unlock(_region: &[u8]) {}
}
