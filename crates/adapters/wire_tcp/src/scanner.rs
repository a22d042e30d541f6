//! Resynchronising scanner over the inbound byte stream.
//!
//! The device interleaves keep-alives, replies to earlier requests and the
//! occasional run of noise. [`FrameScanner`] buffers raw reads and yields one
//! candidate frame at a time; callers decide which frames they care about.

use bytes::{Buf, BytesMut};

use crate::codec::{
    Frame, HEADER_LEN, KEEP_ALIVE_LEN, KEEP_ALIVE_MARKER, START_MAGIC, decode_frame,
};
use crate::error::FrameError;

const INITIAL_CAPACITY: usize = 512;

/// Incremental frame scanner.
#[derive(Debug)]
pub struct FrameScanner {
    buf: BytesMut,
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Append bytes read from the stream.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Bytes currently held back waiting for more input.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pull the next candidate frame out of the buffer.
    ///
    /// Returns `None` when more bytes are needed. A candidate that fails to
    /// decode is consumed and returned as an error so the caller can log it;
    /// scanning can continue with the next call.
    pub fn next_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        loop {
            if self.buf.len() < HEADER_LEN {
                return None;
            }

            if self.buf.starts_with(&KEEP_ALIVE_MARKER) {
                if self.buf.len() < KEEP_ALIVE_LEN {
                    return None;
                }
                self.buf.advance(KEEP_ALIVE_LEN);
                continue;
            }

            match find_start(&self.buf) {
                None => {
                    let keep = partial_marker_suffix(&self.buf);
                    let noise = self.buf.len() - keep;
                    tracing::trace!(bytes = noise, "discarding noise");
                    self.buf.advance(noise);
                    return None;
                }
                Some(0) => {}
                Some(start) => {
                    tracing::trace!(bytes = start, "skipping bytes before start magic");
                    self.buf.advance(start);
                    continue;
                }
            }

            let total = HEADER_LEN + usize::from(self.buf[HEADER_LEN - 1]);
            if self.buf.len() < total {
                return None;
            }

            let raw = self.buf.split_to(total).freeze();
            return Some(decode_frame(raw));
        }
    }
}

fn find_start(buf: &[u8]) -> Option<usize> {
    buf.windows(START_MAGIC.len())
        .position(|window| window == START_MAGIC)
}

/// Length of the longest tail of `buf` that could begin a marker.
fn partial_marker_suffix(buf: &[u8]) -> usize {
    (1..KEEP_ALIVE_MARKER.len().min(buf.len() + 1))
        .rev()
        .find(|&len| {
            let tail = &buf[buf.len() - len..];
            START_MAGIC.starts_with(tail) || KEEP_ALIVE_MARKER.starts_with(tail)
        })
        .unwrap_or(0)
}
