//! Per-download progress counters
//!
//! Lives only for the duration of one file transfer.

use std::fmt;

/// Bytes written so far and the declared total, if the server sent one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferState {
    /// Bytes written to the destination so far
    pub bytes_read: u64,

    /// Declared `Content-Length`, None when the server did not send one
    pub total_bytes: Option<u64>,
}

impl TransferState {
    /// Creates the state for a transfer that has not written anything yet
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            bytes_read: 0,
            total_bytes,
        }
    }

    /// Records `len` more bytes written
    pub fn advance(&mut self, len: usize) {
        self.bytes_read += len as u64;
    }

    /// Percentage complete, only when the total is known and non-zero
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(self.bytes_read as f64 * 100.0 / total as f64),
            _ => None,
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.total_bytes, self.percent()) {
            (Some(total), Some(percent)) => write!(
                f,
                "Downloaded {} of {} bytes ({:.2}%).",
                self.bytes_read, total, percent
            ),
            _ => write!(f, "Downloaded {} bytes.", self.bytes_read),
        }
    }
}
