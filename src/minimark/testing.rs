//! Testing utilities
//!
//!     Factories for building expected token trees, and assertions for the properties every
//!     tokenization must have:
//!
//!         - Round trip: detokenizing the tokens gives back the input.
//!         - No loss: the leaves hold every character of the input that is not a branch
//!           delimiter, and no leaf is empty.
//!
//!     Prefer comparing whole token sequences built with the factories over poking at
//!     individual tokens:
//!
//!     ```rust,ignore
//!     assert_eq!(
//!         tokenize("ola *k ase*", default_grammar()),
//!         vec![word("ola "), branch("bold", vec![word("k ase")])]
//!     );
//!     ```

use crate::minimark::formats::detokenize;
use crate::minimark::grammar::{constraints, Grammar, TokenType, WORD};
use crate::minimark::token::{Token, Tokens};
use crate::minimark::tokenizer::Tokenizer;

/// A `word` leaf.
pub fn word(text: &str) -> Token {
    Token::leaf(WORD, text)
}

pub fn leaf(kind: &str, text: &str) -> Token {
    Token::leaf(kind, text)
}

pub fn branch(kind: &str, children: Tokens) -> Token {
    Token::branch(kind, children)
}

/// Link, labelled link and emoji: the custom grammar used throughout the tests.
///
///     link        http(s) URL
///     label-link  <...>, interior tokenized with links only
///     emoji       :+1: or :trollface:
pub fn link_grammar() -> Grammar {
    let link = TokenType::constrained("link", constraints::url());
    let label_inner = Grammar::new(vec![link.clone()]).expect("valid inner grammar");
    Grammar::new(vec![
        link,
        TokenType::delimited("label-link", "<", ">").with_grammar(label_inner),
        TokenType::constrained("emoji", constraints::literals([":+1:", ":trollface:"])),
    ])
    .expect("valid link grammar")
}

/// Tokenize `source` and assert that it round trips and loses nothing.
pub fn assert_round_trip(tokenizer: &Tokenizer<'_>, grammar: &Grammar, source: &str) -> Tokens {
    let tokens = tokenizer.tokenize(source);
    let rebuilt = detokenize(&tokens, grammar);
    assert_eq!(
        rebuilt, source,
        "round trip mismatch\n  source:  {:?}\n  rebuilt: {:?}\n  tokens:  {:?}",
        source, rebuilt, tokens
    );
    assert_no_empty_leaves(&tokens);
    tokens
}

/// Every leaf holds text and every branch holds children.
pub fn assert_no_empty_leaves(tokens: &[Token]) {
    for token in tokens {
        token.walk(&mut |token, depth| match token.text() {
            Some(text) => assert!(
                !text.is_empty(),
                "empty `{}` leaf at depth {}",
                token.kind(),
                depth
            ),
            None => assert!(
                token.children().is_some_and(|c| !c.is_empty()),
                "empty `{}` branch at depth {}",
                token.kind(),
                depth
            ),
        });
    }
}
