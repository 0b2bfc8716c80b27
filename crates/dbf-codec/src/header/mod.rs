//! DBF header parsing and building.
//!
//! A DBF file starts with a fixed 32-byte table header, followed by one
//! 32-byte subrecord per field and a `0x0D` terminator. Records follow at
//! the offset the header declares, and an optional `0x1A` byte ends the file.

pub mod field;
pub mod table;

pub use field::{build_field, parse_field, parse_field_table};
pub use table::{
    DELETED_FLAG, DbfHeader, END_OF_FILE, FIELD_RECORD_LEN, FIELD_TERMINATOR, HEADER_LEN,
    LIVE_FLAG, VERSION_NO_MEMO, build_header, header_size_for, parse_header,
};
