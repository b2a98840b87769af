//! # minimark
//!
//! A small grammar-driven tokenizer for inline markup.
//!
//! ```rust,ignore
//! use minimark::{default_grammar, tokenize};
//!
//! let tokens = tokenize("ola *k ase*", default_grammar());
//! // [word "ola ", bold [word "k ase"]]
//! ```
//!
//! Custom grammars compose [TokenType](minimark::TokenType)s in priority order; see the
//! [grammar module](minimark::grammar). For testing guidelines, see the
//! [testing module](minimark::testing).

pub mod minimark;

pub use minimark::{
    default_grammar, tokenize, Grammar, GrammarError, Token, TokenType, Tokenizer,
    TokenizerOptions,
};
