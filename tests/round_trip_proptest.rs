//! Property-based tests for the tokenizer
//!
//! For any input and any grammar:
//! - tokenization terminates and never panics
//! - detokenizing the tokens gives back the input exactly
//! - no leaf or branch is empty

use minimark::minimark::formats::detokenize;
use minimark::minimark::testing::{assert_no_empty_leaves, link_grammar};
use minimark::{default_grammar, tokenize, Grammar, Tokenizer, TokenizerOptions};
use proptest::prelude::*;

/// Text dense in markup characters so branches open, close and fail often.
fn markup_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-c *_~`]{0,40}",
        "[a-c *_~`\n]{0,80}",
        "[ab<>|:+1 ]{0,40}",
        "(http://x\\.io|<|>|:\\+1:|\\*|_| |ñ|☕){0,20}",
        any::<String>(),
    ]
}

fn check(source: &str, grammar: &Grammar) -> Result<(), TestCaseError> {
    let tokens = tokenize(source, grammar);
    prop_assert_eq!(detokenize(&tokens, grammar), source);
    assert_no_empty_leaves(&tokens);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn default_grammar_round_trips(source in markup_strategy()) {
        check(&source, default_grammar())?;
    }

    #[test]
    fn link_grammar_round_trips(source in markup_strategy()) {
        check(&source, &link_grammar())?;
    }

    #[test]
    fn depth_limit_round_trips(source in "[*_~ a]{0,60}", max_depth in 0usize..4) {
        let grammar = default_grammar();
        let tokens = Tokenizer::new(grammar)
            .with_options(TokenizerOptions { max_depth })
            .tokenize(&source);
        prop_assert_eq!(detokenize(&tokens, grammar), source);

        let mut deepest_branch = 0;
        for token in &tokens {
            token.walk(&mut |t, d| {
                if !t.is_leaf() {
                    deepest_branch = deepest_branch.max(d + 1);
                }
            });
        }
        prop_assert!(deepest_branch <= max_depth);
    }

    #[test]
    fn plain_text_is_one_word(source in "[a-z ,.!?]{1,40}") {
        let tokens = tokenize(&source, default_grammar());
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].text(), Some(source.as_str()));
    }
}

#[test]
fn markup_that_never_closes_round_trips() {
    let source = "*_~".repeat(100);
    let tokens = tokenize(&source, default_grammar());
    assert_eq!(detokenize(&tokens, default_grammar()), source);
}
