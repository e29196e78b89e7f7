//! Upload handling
//!
//! Content sniffing, payload validation, and the validate-then-write pipeline.

pub mod pipeline;
pub mod sniff;
pub mod validator;

pub use pipeline::IngestionPipeline;
pub use sniff::sniff_content_type;
pub use validator::UploadValidator;
