//! Field subrecord parsing and building.
//!
//! # Field Subrecord (32 bytes)
//!
//! | Offset | Field    | Type     | Description                        |
//! |--------|----------|----------|------------------------------------|
//! | 0-10   | name     | char[11] | Name, NUL-padded (10 bytes used)   |
//! | 11     | type     | u8       | `C`, `N`, `D`, `L`, ...            |
//! | 12-15  | address  | u32      | Unused, zero                       |
//! | 16     | size     | u8       | Field width in bytes               |
//! | 17     | decimal  | u8       | Fractional digits (numeric only)   |
//! | 18-31  | reserved | char[14] | Zeros                              |

use crate::codepage::CodePage;
use crate::types::{FieldDescriptor, FieldType, MAX_NAME_BYTES};

use super::table::{FIELD_RECORD_LEN, FIELD_TERMINATOR, HEADER_LEN};

const TYPE_OFFSET: usize = 11;
const SIZE_OFFSET: usize = 16;
const DECIMAL_OFFSET: usize = 17;

/// Parse one 32-byte field subrecord.
///
/// Printable ASCII names are taken as-is; names containing other bytes are
/// decoded under `code_page`, the way the writer encoded them.
#[must_use]
pub fn parse_field(data: &[u8], code_page: &CodePage) -> FieldDescriptor {
    FieldDescriptor {
        name: read_name(&data[..MAX_NAME_BYTES], code_page),
        field_type: FieldType::from_code(data[TYPE_OFFSET]),
        size: data[SIZE_OFFSET],
        decimal: data[DECIMAL_OFFSET],
    }
}

/// Walk the field table from offset 32 until the `0x0D` terminator.
///
/// Stops early when the next subrecord would run past the buffer. Names
/// are returned exactly as stored; duplicates are not resolved here.
#[must_use]
pub fn parse_field_table(data: &[u8], code_page: &CodePage) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    let mut offset = HEADER_LEN;

    while offset < data.len() && data[offset] != FIELD_TERMINATOR {
        let Some(record) = data.get(offset..offset + FIELD_RECORD_LEN) else {
            break;
        };
        fields.push(parse_field(record, code_page));
        offset += FIELD_RECORD_LEN;
    }

    fields
}

/// Build a 32-byte field subrecord.
///
/// The name is encoded under `code_page` and cut to at most 10 bytes on a
/// character boundary; the rest of the name slot is NUL.
#[must_use]
pub fn build_field(field: &FieldDescriptor, code_page: &CodePage) -> [u8; FIELD_RECORD_LEN] {
    let mut buf = [0u8; FIELD_RECORD_LEN];

    let name = code_page.encode_within(&field.name, MAX_NAME_BYTES);
    buf[..name.len()].copy_from_slice(&name);

    buf[TYPE_OFFSET] = field.field_type.code();
    buf[SIZE_OFFSET] = field.size;
    buf[DECIMAL_OFFSET] = field.header_decimal();

    buf
}

fn read_name(bytes: &[u8], code_page: &CodePage) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let raw = &bytes[..end];

    if raw.is_ascii() {
        raw.iter()
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim()
            .to_string()
    } else {
        code_page.decode(raw).trim().to_string()
    }
}
