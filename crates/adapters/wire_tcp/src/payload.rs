//! Command payloads carried in the `args` of request and reply frames.
//!
//! | Command | Request args | Reply args |
//! |---------|--------------|------------|
//! | mode query | none | `[mode]`, `0x01` = manual |
//! | mode set | `[0x01 manual / 0x02 auto]` | ignored |
//! | intensity set / preview | `[ch1, ch2, ch3, ch4]` | ignored |
//! | intensity query | none | `[ch1, ch2, ch3, ch4, ..]` |
//! | program set | program | `[ack]` |
//! | program query | none | program |
//!
//! A program is a count byte followed by that many seven-byte records
//! `(index, hour, minute, ch1, ch2, ch3, ch4)` in ascending index order.

use icv6_domain::lighting::{DeviceMode, Intensity, Program, ProgramPoint};

use crate::codec::MAX_ARGS_LEN;
use crate::error::PayloadError;

/// Size of one program record.
pub const POINT_RECORD_LEN: usize = 7;

/// Most points a single program frame can carry.
pub const MAX_PROGRAM_POINTS: usize = (MAX_ARGS_LEN - 1) / POINT_RECORD_LEN;

const MODE_MANUAL: u8 = 0x01;
const MODE_AUTO: u8 = 0x02;
const INTENSITY_LEN: usize = 4;

#[must_use]
pub fn encode_mode(mode: DeviceMode) -> [u8; 1] {
    match mode {
        DeviceMode::Manual => [MODE_MANUAL],
        DeviceMode::Auto => [MODE_AUTO],
    }
}

/// Any byte other than `0x01` reports auto mode.
///
/// # Errors
///
/// Returns [`PayloadError::MissingArgs`] for an empty reply.
pub fn decode_mode(args: &[u8]) -> Result<DeviceMode, PayloadError> {
    match args.first() {
        None => Err(PayloadError::MissingArgs),
        Some(&MODE_MANUAL) => Ok(DeviceMode::Manual),
        Some(_) => Ok(DeviceMode::Auto),
    }
}

#[must_use]
pub fn encode_intensity(intensity: Intensity) -> [u8; INTENSITY_LEN] {
    intensity.channels()
}

/// Read the first four bytes as channel levels; extra bytes are ignored.
///
/// # Errors
///
/// Returns [`PayloadError::TooShort`] when fewer than four bytes arrived.
pub fn decode_intensity(args: &[u8]) -> Result<Intensity, PayloadError> {
    match args {
        [ch1, ch2, ch3, ch4, ..] => Ok(Intensity::from_channels([*ch1, *ch2, *ch3, *ch4])),
        _ => Err(PayloadError::TooShort {
            expected: INTENSITY_LEN,
            actual: args.len(),
        }),
    }
}

/// The acknowledgement byte of a program upload, `0` when absent.
#[must_use]
pub fn decode_ack(args: &[u8]) -> u8 {
    args.first().copied().unwrap_or(0)
}

/// Serialize a program, sorted by ascending index.
///
/// # Errors
///
/// Returns [`PayloadError::TooManyPoints`] if the program does not fit in a
/// single frame.
pub fn encode_program(program: &Program) -> Result<Vec<u8>, PayloadError> {
    let count = program.points.len();
    let count_byte = u8::try_from(count)
        .ok()
        .filter(|_| count <= MAX_PROGRAM_POINTS)
        .ok_or(PayloadError::TooManyPoints {
            count,
            max: MAX_PROGRAM_POINTS,
        })?;

    let mut out = Vec::with_capacity(1 + count * POINT_RECORD_LEN);
    out.push(count_byte);
    for p in program.canonical().points {
        out.extend_from_slice(&[p.index, p.hour, p.minute, p.ch1, p.ch2, p.ch3, p.ch4]);
    }
    Ok(out)
}

/// Parse a program payload. Empty args mean an empty program.
///
/// # Errors
///
/// Returns [`PayloadError::ProgramLength`] when the record bytes do not match
/// the declared point count.
pub fn decode_program(args: &[u8]) -> Result<Program, PayloadError> {
    let Some((&count, records)) = args.split_first() else {
        return Ok(Program::default());
    };
    if records.len() != usize::from(count) * POINT_RECORD_LEN {
        return Err(PayloadError::ProgramLength {
            count,
            actual: records.len(),
        });
    }

    let points = records
        .chunks_exact(POINT_RECORD_LEN)
        .map(|rec| ProgramPoint {
            index: rec[0],
            hour: rec[1],
            minute: rec[2],
            ch1: rec[3],
            ch2: rec[4],
            ch3: rec[5],
            ch4: rec[6],
        })
        .collect();
    Ok(Program::new(points))
}
