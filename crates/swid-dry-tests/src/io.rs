// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer doubles.

use std::io::{self, Write};

/// Writer that accepts `limit` bytes and then fails every call.
///
/// # Example
///
/// ```
/// use std::io::Write;
/// use swid_dry_tests::FailingWriter;
///
/// let mut out = FailingWriter::after(2);
/// assert!(out.write_all(b"ab").is_ok());
/// assert!(out.write_all(b"c").is_err());
/// assert_eq!(out.written(), b"ab");
/// ```
#[derive(Debug, Default)]
pub struct FailingWriter {
    limit: usize,
    written: Vec<u8>,
    attempts: usize,
}

impl FailingWriter {
    /// A writer that rejects the first byte.
    pub fn always() -> Self {
        Self::default()
    }

    /// A writer that accepts `limit` bytes before failing.
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Bytes accepted so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of `write` calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.attempts += 1;
        let room = self.limit.saturating_sub(self.written.len());
        if room == 0 && !buf.is_empty() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "writer closed"));
        }
        let n = buf.len().min(room);
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
