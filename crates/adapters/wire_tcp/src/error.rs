//! Wire adapter error types.

use std::time::Duration;

use icv6_domain::error::Icv6Error;

/// A single frame could not be built or parsed.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The device serial is not exactly 11 ASCII characters.
    #[error("device id must be 11 ASCII characters, got {0:?}")]
    InvalidDeviceId(String),

    /// The args do not fit behind a one-byte length field.
    #[error("args of {size} bytes exceed the {max}-byte frame limit")]
    PayloadTooLarge {
        /// Args length requested.
        size: usize,
        /// Largest args length a frame can carry.
        max: usize,
    },

    /// Fewer bytes than the smallest possible frame.
    #[error("frame of {0} bytes is shorter than the minimum")]
    TooShort(usize),

    /// The buffer does not start with the start magic.
    #[error("invalid frame header")]
    BadMagic,

    /// The declared length disagrees with the bytes received.
    #[error("invalid frame length: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The trailing checksum byte does not match the frame content.
    #[error("bad checksum: computed {computed:#04x}, frame carries {received:#04x}")]
    BadChecksum { computed: u8, received: u8 },
}

/// A reply frame arrived but its args could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The reply carried no args at all.
    #[error("response missing args")]
    MissingArgs,

    /// Fewer bytes than the fixed-size payload needs.
    #[error("response too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// The program record bytes disagree with the declared point count.
    #[error("invalid program payload: {count} points declared, {actual} record bytes")]
    ProgramLength { count: u8, actual: usize },

    /// The program has more points than one frame can carry.
    #[error("program has {count} points, at most {max} fit in one frame")]
    TooManyPoints { count: usize, max: usize },
}

/// Errors surfaced by a single request against the device.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The TCP connection could not be opened.
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request frame failed.
    #[error("failed to send request")]
    Write(#[source] std::io::Error),

    /// Reading from the stream failed.
    #[error("failed to read response")]
    Read(#[source] std::io::Error),

    /// The peer closed the stream before the expected reply arrived.
    #[error("connection closed before expected response")]
    Closed,

    /// The whole exchange did not complete in time.
    #[error("{command} timed out after {timeout:?}")]
    Timeout {
        command: &'static str,
        timeout: Duration,
    },

    /// The request frame could not be built.
    #[error("failed to encode request")]
    Frame(#[from] FrameError),

    /// The reply frame carried unusable args.
    #[error("failed to decode {command} response")]
    Payload {
        command: &'static str,
        #[source]
        source: PayloadError,
    },
}

impl From<WireError> for Icv6Error {
    fn from(err: WireError) -> Self {
        Self::Device(Box::new(err))
    }
}
