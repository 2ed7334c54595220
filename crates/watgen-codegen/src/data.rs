//! Linear-memory layout for data literals.
//!
//! Literals are laid out back to back from offset 0 in registration order:
//! no alignment padding, no de-duplication.  Once every literal has been
//! registered, [`DataAllocator::cursor`] is the number of bytes the module's
//! memory has to declare.
//!
//! The region is addressed with 32-bit offsets, so it holds at most
//! `u32::MAX` bytes.  A literal that does not fit is not placed: it gets the
//! current cursor as its offset, the cursor stays put and the allocator is
//! marked overflowed.

use std::fmt::Write;

/// Bump allocator over the data region.
#[derive(Debug, Clone, Default)]
pub struct DataAllocator {
    /// Next free offset in the data region.
    next_offset: u32,
    /// `(offset, len)` of each registered literal, in order.
    regions: Vec<(u32, u32)>,
    overflowed: bool,
}

impl DataAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn starting_at(offset: u32) -> Self {
        Self {
            next_offset: offset,
            ..Self::default()
        }
    }

    /// Reserve space for `bytes`; returns the offset they will live at.
    pub fn register(&mut self, bytes: &[u8]) -> u32 {
        let offset = self.next_offset;
        let end = u32::try_from(bytes.len())
            .ok()
            .and_then(|len| offset.checked_add(len).map(|end| (len, end)));
        let Some((len, end)) = end else {
            tracing::warn!(offset, len = bytes.len(), "data literal does not fit in 32-bit memory");
            self.overflowed = true;
            return offset;
        };
        self.next_offset = end;
        self.regions.push((offset, len));
        tracing::debug!(offset, len, "registered data literal");
        offset
    }

    /// Reserve space for a NUL-terminated UTF-8 string.
    ///
    /// Returns the offset and the encoded bytes (terminator included).
    pub fn register_str(&mut self, text: &str) -> (u32, Vec<u8>) {
        let bytes = terminated(text);
        let offset = self.register(&bytes);
        (offset, bytes)
    }

    /// Next free offset, which is also the total size registered so far.
    pub fn cursor(&self) -> u32 {
        self.next_offset
    }

    /// Whether some literal did not fit in the 32-bit address space.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Registered `(offset, len)` regions in order.
    pub fn regions(&self) -> &[(u32, u32)] {
        &self.regions
    }
}

/// UTF-8 bytes of `text` followed by a NUL byte.
pub fn terminated(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0);
    bytes
}

/// Render bytes as the body of a data string literal: `\hh` per byte.
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        let _ = write!(out, "\\{b:02x}");
    }
    out
}
