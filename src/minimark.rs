//! Grammar-driven inline tokenizer
//!
//!     Turns a string into a tree of tokens according to a grammar: an ordered list of token
//!     types. Leaf types produce text tokens (plain words, links, emoji codes); branch types
//!     produce tokens wrapping the tokens found between a start and an end delimiter (bold,
//!     italic, fenced blocks).
//!
//!     Layout:
//!
//!         token       The output tree.
//!         grammar     Token types, grammars, constraints and the stock markup grammar.
//!         tokenizer   The recursive scan that builds the tree.
//!         formats     Detokenizer, treeviz and JSON views of a token tree.
//!         testing     Factories and assertions for tests.
//!
//!     Tokenization is total: every input has a tokenization and unmatched markup is kept as
//!     plain text, so there is no error path once a grammar has been built.

pub mod formats;
pub mod grammar;
pub mod testing;
pub mod token;
pub mod tokenizer;

pub use grammar::defaults::default_grammar;
pub use grammar::{Constraint, Grammar, GrammarError, Match, Matcher, TokenType, WORD};
pub use token::{Token, TokenContent, Tokens};
pub use tokenizer::{tokenize, Tokenizer, TokenizerOptions, DEFAULT_MAX_DEPTH};
