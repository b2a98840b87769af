//! JSON export of token trees
//!
//! Tokens serialize as `{"type": kind, "text": ...}` for leaves and
//! `{"type": kind, "children": [...]}` for branches.

use crate::minimark::token::Token;
use serde_json::Value;

pub fn to_json_value(tokens: &[Token]) -> serde_json::Result<Value> {
    serde_json::to_value(tokens)
}

pub fn to_json_string(tokens: &[Token]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tokens)
}

pub fn from_json_str(json: &str) -> serde_json::Result<Vec<Token>> {
    serde_json::from_str(json)
}
