//! Detokenizer
//!
//! Converts a token sequence back into the source text it was produced from. Leaves carry
//! their text verbatim; branches only carry their kind, so the delimiters are looked up in
//! the grammar the tokens came from.
//!
//! For any input `s` and grammar `g`, `detokenize(&tokenize(s, g), g) == s`.

use crate::minimark::grammar::{Grammar, TokenType};
use crate::minimark::token::{Token, TokenContent};

/// Rebuild the source text of a single token.
pub trait ToSource {
    fn to_source(&self, grammar: &Grammar) -> String;
}

impl ToSource for Token {
    fn to_source(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        write_token(self, &mut vec![grammar], &mut out);
        out
    }
}

/// Rebuild the source text of a token sequence.
pub fn detokenize(tokens: &[Token], grammar: &Grammar) -> String {
    let mut out = String::new();
    let mut scopes = vec![grammar];
    for token in tokens {
        write_token(token, &mut scopes, &mut out);
    }
    out
}

fn write_token<'g>(token: &Token, scopes: &mut Vec<&'g Grammar>, out: &mut String) {
    let children = match &token.content {
        TokenContent::Text(text) => {
            out.push_str(text);
            return;
        }
        TokenContent::Children(children) => children,
    };

    let Some(token_type) = lookup(&token.kind, scopes) else {
        log::warn!("no branch type `{}` in grammar, writing children only", token.kind);
        for child in children {
            write_token(child, scopes, out);
        }
        return;
    };

    out.push_str(token_type.start().unwrap_or_default());
    let inner = token_type.inner_grammar();
    if let Some(inner) = inner {
        scopes.push(inner);
    }
    for child in children {
        write_token(child, scopes, out);
    }
    if inner.is_some() {
        scopes.pop();
    }
    out.push_str(token_type.end().unwrap_or_default());
}

/// Innermost grammar declaring `kind` wins, then a deep search from the root.
fn lookup<'g>(kind: &str, scopes: &[&'g Grammar]) -> Option<&'g TokenType> {
    scopes
        .iter()
        .rev()
        .find_map(|grammar| grammar.iter().find(|t| t.kind() == kind))
        .or_else(|| scopes.first().and_then(|root| root.find(kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimark::grammar::defaults::default_grammar;
    use crate::minimark::testing::{branch, word};
    use crate::minimark::tokenizer::tokenize;

    #[test]
    fn detokenize_restores_delimiters() {
        let tokens = vec![word("ola "), branch("bold", vec![word("k ase")])];
        assert_eq!(detokenize(&tokens, default_grammar()), "ola *k ase*");
    }

    #[test]
    fn detokenize_nested() {
        let source = "*hey* have _you_ seen ~how *amazing* this~ is? ```may *this* work?```, `lol`";
        let tokens = tokenize(source, default_grammar());
        assert_eq!(detokenize(&tokens, default_grammar()), source);
    }

    #[test]
    fn single_token_to_source() {
        let token = branch("pre", vec![word("a *b*")]);
        assert_eq!(token.to_source(default_grammar()), "```a *b*```");
    }

    #[test]
    fn inner_grammar_scope_wins() {
        let inner = Grammar::new(vec![TokenType::surround("em", "__")]).unwrap();
        let grammar = Grammar::new(vec![
            TokenType::surround("em", "_"),
            TokenType::delimited("box", "[", "]").with_grammar(inner),
        ])
        .unwrap();
        let source = "_a_ [__b__]";
        let tokens = tokenize(source, &grammar);
        assert_eq!(detokenize(&tokens, &grammar), source);
    }

    #[test]
    fn unknown_branch_writes_children() {
        let tokens = vec![branch("mystery", vec![word("x")])];
        assert_eq!(detokenize(&tokens, default_grammar()), "x");
    }
}
