//! Reply codes and formatting
//!
//! Error reply codes live with the error mapping in `error::handlers`.

pub const DATA_FOLLOWS: u16 = 150;
pub const READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const COMPLETE: u16 = 226;
pub const SYNTAX_ERROR: u16 = 500;
pub const ARGUMENT_ERROR: u16 = 501;

/// Format one reply line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}
