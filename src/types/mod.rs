pub mod error;
pub mod row;
pub mod value;

/// Separates positional fields within a line of every table file.
pub const FIELD_SEPARATOR: char = '\u{0001}';

/// Stored token for an absent value. Compared case-insensitively.
pub const NULL_SENTINEL: &str = "null";

/// Number of header lines (names, types, constraints) in definition and record files.
pub const HEADER_LINES: usize = 3;

/// Maximum length of a database, table or column name.
pub const MAX_NAME_LENGTH: usize = 128;

/// Checks a database/table/column name against `[A-Za-z_]\w*` and the length limit.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_null_sentinel(field: &str) -> bool {
    field.eq_ignore_ascii_case(NULL_SENTINEL)
}
