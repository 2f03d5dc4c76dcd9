// ============================================================================
// Ingest Module
// CSV boundary: field parsing, validation, and output rendering
// ============================================================================

pub mod parser;
pub mod validator;

pub use parser::{format_record, parse_line, read_orders, write_output, IngestError, OUTPUT_HEADER};
pub use validator::{validate_record, ValidationError, MAX_QUANTITY};
