//! Stock inline markup grammar
//!
//!     | kind   | marker | interior                    |
//!     |--------|--------|-----------------------------|
//!     | pre    | ```    | not parsed, a single word   |
//!     | code   | `      | default grammar             |
//!     | italic | _      | default grammar             |
//!     | bold   | *      | default grammar             |
//!     | strike | ~      | default grammar             |
//!
//!     `pre` comes first so a fence is never read as three code markers.

use super::{Grammar, TokenType};
use once_cell::sync::Lazy;

pub const PRE: &str = "pre";
pub const CODE: &str = "code";
pub const ITALIC: &str = "italic";
pub const BOLD: &str = "bold";
pub const STRIKE: &str = "strike";

static DEFAULT_GRAMMAR: Lazy<Grammar> = Lazy::new(build);

fn build() -> Grammar {
    Grammar {
        types: default_types(),
    }
}

/// The stock token types, in priority order.
pub fn default_types() -> Vec<TokenType> {
    vec![
        TokenType::surround(PRE, "```").with_grammar(Grammar::empty()),
        TokenType::surround(CODE, "`"),
        TokenType::surround(ITALIC, "_"),
        TokenType::surround(BOLD, "*"),
        TokenType::surround(STRIKE, "~"),
    ]
}

/// Shared instance of the stock grammar.
pub fn default_grammar() -> &'static Grammar {
    &DEFAULT_GRAMMAR
}
