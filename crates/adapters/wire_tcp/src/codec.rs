//! Frame codec for the ICV6 wire dialect. Pure functions, no IO.
//!
//! Wire format:
//! ```text
//! ┌──────────┬──────┬─────┬──────┬──────────┬──────┬───────┬────┬──────┬──────────┐
//! │ DD EE FF │ 0x00 │ len │ 0xFF │ serial   │ 0x01 │ group │ id │ args │ checksum │
//! │ 3B       │ 1B   │ 1B  │ 1B   │ 11B      │ 1B   │ 1B    │ 1B │ var  │ 1B       │
//! └──────────┴──────┴─────┴──────┴──────────┴──────┴───────┴────┴──────┴──────────┘
//!                          └──────────────── body ───────────────────┘
//! ```
//!
//! `len = len(body) + 1` and `checksum = (len + sum(body)) mod 256`.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Deserialize;

use crate::error::FrameError;

/// Start magic of every data frame.
pub const START_MAGIC: [u8; 3] = [0xDD, 0xEE, 0xFF];

/// Leading marker of a keep-alive frame.
pub const KEEP_ALIVE_MARKER: [u8; 4] = [0xFF, 0xEE, 0xDD, 0xCC];

/// Total size of a keep-alive frame.
pub const KEEP_ALIVE_LEN: usize = 9;

/// Magic, reserved byte and length field.
pub const HEADER_LEN: usize = 5;

/// Smallest decodable frame: header, a body without args, checksum.
pub const MIN_FRAME_LEN: usize = 21;

/// Length of the device serial on the wire.
pub const SERIAL_LEN: usize = 11;

/// Largest args the one-byte length field can describe.
pub const MAX_ARGS_LEN: usize = u8::MAX as usize - 1 - BODY_FIXED_LEN;

/// Group byte of every request sent to the device.
pub const REQUEST_GROUP: u8 = 0x0F;

/// Group byte of every reply sent by the device.
pub const REPLY_GROUP: u8 = 0x5F;

const BODY_TAG: u8 = 0xFF;
const PROTOCOL_TAG: u8 = 0x01;
/// Tag, serial, protocol tag, group and id.
const BODY_FIXED_LEN: usize = 1 + SERIAL_LEN + 1 + 2;

const GROUP_OFFSET: usize = 18;
const ID_OFFSET: usize = 19;
const ARGS_OFFSET: usize = 20;
const SERIAL_OFFSET: usize = 6;

/// Device commands. Requests and replies share the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    QueryMode = 0x01,
    SetMode = 0x02,
    PreviewIntensity = 0x0B,
    SetIntensity = 0x0C,
    QueryIntensity = 0x0D,
    SetProgram = 0x0E,
    QueryProgram = 0x0F,
}

impl Command {
    /// Wire id of this command.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name for logs and errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::QueryMode => "mode query",
            Self::SetMode => "mode set",
            Self::PreviewIntensity => "preview intensity",
            Self::SetIntensity => "intensity set",
            Self::QueryIntensity => "intensity query",
            Self::SetProgram => "program set",
            Self::QueryProgram => "program query",
        }
    }
}

/// The 11-character ASCII identifier embedded in every frame.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct DeviceSerial([u8; SERIAL_LEN]);

impl DeviceSerial {
    /// Parse a serial.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidDeviceId`] unless `value` is exactly 11
    /// ASCII characters.
    pub fn new(value: &str) -> Result<Self, FrameError> {
        let bytes: [u8; SERIAL_LEN] = value
            .as_bytes()
            .try_into()
            .ok()
            .filter(|_| value.is_ascii())
            .ok_or_else(|| FrameError::InvalidDeviceId(value.to_string()))?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for DeviceSerial {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeviceSerial").field(&self.as_str()).finish()
    }
}

/// A decoded data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The complete frame, magic to checksum.
    pub raw: Bytes,
    pub cmd_group: u8,
    pub cmd_id: u8,
    /// Opaque command payload.
    pub args: Bytes,
    /// Serial as found in the frame; non-ASCII bytes are replaced.
    pub device_id: String,
}

fn checksum(length_field: u8, body: &[u8]) -> u8 {
    body.iter().fold(length_field, |acc, &b| acc.wrapping_add(b))
}

/// Encode one frame.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] when `args` exceeds
/// [`MAX_ARGS_LEN`].
pub fn encode_frame(
    serial: &DeviceSerial,
    cmd_group: u8,
    cmd_id: u8,
    args: &[u8],
) -> Result<Bytes, FrameError> {
    if args.len() > MAX_ARGS_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: args.len(),
            max: MAX_ARGS_LEN,
        });
    }

    let length_field =
        u8::try_from(BODY_FIXED_LEN + args.len() + 1).map_err(|_| FrameError::PayloadTooLarge {
            size: args.len(),
            max: MAX_ARGS_LEN,
        })?;

    let mut dst = BytesMut::with_capacity(HEADER_LEN + usize::from(length_field));
    dst.put_slice(&START_MAGIC);
    dst.put_u8(0x00);
    dst.put_u8(length_field);
    dst.put_u8(BODY_TAG);
    dst.put_slice(serial.as_bytes());
    dst.put_u8(PROTOCOL_TAG);
    dst.put_u8(cmd_group);
    dst.put_u8(cmd_id);
    dst.put_slice(args);
    let sum = checksum(length_field, &dst[HEADER_LEN..]);
    dst.put_u8(sum);
    Ok(dst.freeze())
}

/// Decode exactly one frame.
///
/// # Errors
///
/// Returns a [`FrameError`] when the bytes are too short, lack the start
/// magic, disagree with the declared length, or fail the checksum.
pub fn decode_frame(raw: Bytes) -> Result<Frame, FrameError> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(FrameError::TooShort(raw.len()));
    }
    if raw[..START_MAGIC.len()] != START_MAGIC {
        return Err(FrameError::BadMagic);
    }

    let length_field = raw[HEADER_LEN - 1];
    let expected = HEADER_LEN + usize::from(length_field);
    if raw.len() != expected {
        return Err(FrameError::LengthMismatch {
            expected,
            actual: raw.len(),
        });
    }

    let last = raw.len() - 1;
    let computed = checksum(length_field, &raw[HEADER_LEN..last]);
    if computed != raw[last] {
        return Err(FrameError::BadChecksum {
            computed,
            received: raw[last],
        });
    }

    let device_id = raw[SERIAL_OFFSET..SERIAL_OFFSET + SERIAL_LEN]
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                char::from(b)
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect();

    Ok(Frame {
        cmd_group: raw[GROUP_OFFSET],
        cmd_id: raw[ID_OFFSET],
        args: raw.slice(ARGS_OFFSET..last),
        device_id,
        raw,
    })
}
