//! Tabular parsing
//!
//! Turns stored delimiter-separated files into header-plus-rows tables.

pub mod encode;
pub mod parser;
pub mod results;

pub use encode::encode;
pub use parser::{parse, parse_bytes};
pub use results::TabularData;
