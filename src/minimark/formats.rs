//! Output formats for token trees
//!
//! Rendering markup to a presentation format is left to consumers. What lives here is what
//! tooling and tests need: the detokenizer that rebuilds source text, a treeviz debug view,
//! and JSON export.

pub mod detokenizer;
pub mod json;
pub mod treeviz;

pub use detokenizer::{detokenize, ToSource};
pub use json::{from_json_str, to_json_string, to_json_value};
pub use treeviz::to_treeviz_str;
