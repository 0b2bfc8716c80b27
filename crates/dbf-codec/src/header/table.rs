//! Table header record handling.
//!
//! # Structure (32 bytes, little-endian)
//!
//! | Offset | Length | Field          | Description                          |
//! |--------|--------|----------------|--------------------------------------|
//! | 0      | 1      | version        | `0x03` = dBASE III without memo      |
//! | 1-3    | 3      | last update    | YY (since 1900), MM, DD              |
//! | 4-7    | 4      | record count   | u32                                  |
//! | 8-9    | 2      | header size    | u16, `32 + 32 * fields + 1`          |
//! | 10-11  | 2      | record size    | u16, includes the deletion flag      |
//! | 12-28  | 17     | reserved       | zeros                                |
//! | 29     | 1      | language driver| code page hint                       |
//! | 30-31  | 2      | reserved       | zeros                                |

use chrono::{Datelike, NaiveDate};

use crate::error::{DbfError, Result};

/// Table header length in bytes.
pub const HEADER_LEN: usize = 32;

/// Field subrecord length in bytes.
pub const FIELD_RECORD_LEN: usize = 32;

/// Byte closing the field table.
pub const FIELD_TERMINATOR: u8 = 0x0D;

/// Byte closing the file.
pub const END_OF_FILE: u8 = 0x1A;

/// Deletion flag of a removed record (`*`).
pub const DELETED_FLAG: u8 = 0x2A;

/// Deletion flag of a live record.
pub const LIVE_FLAG: u8 = 0x20;

/// Version byte: dBASE III, no memo file.
pub const VERSION_NO_MEMO: u8 = 0x03;

const LANGUAGE_DRIVER_OFFSET: usize = 29;

/// Decoded table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfHeader {
    /// Version byte.
    pub version: u8,
    /// Last-update date, if the stored bytes form a valid date.
    pub last_update: Option<NaiveDate>,
    /// Declared record count.
    pub record_count: u32,
    /// Declared header size (offset of the first record).
    pub header_size: u16,
    /// Declared record size, deletion flag included.
    pub record_size: u16,
    /// Language driver id (0 when unset).
    pub language_driver: u8,
}

/// Parse the table header.
///
/// # Errors
/// Returns a Format error if `data` is shorter than [`HEADER_LEN`].
pub fn parse_header(data: &[u8]) -> Result<DbfHeader> {
    if data.len() < HEADER_LEN {
        return Err(DbfError::format(format!(
            "buffer of {} bytes is smaller than the {HEADER_LEN}-byte header",
            data.len()
        )));
    }

    let last_update = NaiveDate::from_ymd_opt(
        1900 + i32::from(data[1]),
        u32::from(data[2]),
        u32::from(data[3]),
    );

    Ok(DbfHeader {
        version: data[0],
        last_update,
        record_count: read_u32(data, 4),
        header_size: read_u16(data, 8),
        record_size: read_u16(data, 10),
        language_driver: data[LANGUAGE_DRIVER_OFFSET],
    })
}

/// Build the table header.
#[must_use]
pub fn build_header(header: &DbfHeader) -> [u8; HEADER_LEN] {
    let mut buf = [0u8; HEADER_LEN];

    buf[0] = header.version;

    if let Some(date) = header.last_update {
        buf[1] = u8::try_from((date.year() - 1900).clamp(0, 255)).unwrap_or(0);
        buf[2] = date.month() as u8;
        buf[3] = date.day() as u8;
    }

    write_u32(&mut buf, 4, header.record_count);
    write_u16(&mut buf, 8, header.header_size);
    write_u16(&mut buf, 10, header.record_size);
    buf[LANGUAGE_DRIVER_OFFSET] = header.language_driver;

    buf
}

/// Header size for `field_count` fields: `32 + 32 * n + 1`.
///
/// # Errors
/// Returns TooManyFields if the size does not fit in 16 bits.
pub fn header_size_for(field_count: usize) -> Result<u16> {
    field_count
        .checked_mul(FIELD_RECORD_LEN)
        .and_then(|len| len.checked_add(HEADER_LEN + 1))
        .and_then(|len| u16::try_from(len).ok())
        .ok_or(DbfError::TooManyFields { count: field_count })
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
