//! Treeviz formatter for token trees
//!
//! One line per token, nesting drawn with box connectors, two columns per level:
//!
//!     ├─ ◦ word "ola "
//!     └─ 𝐁 bold
//!       └─ ◦ word "k ase"
//!
//! Leaf text is quoted and truncated to 30 characters.
//!
//! Icons
//!     word: ◦
//!     bold: 𝐁
//!     italic: 𝐼
//!     code: ƒ
//!     pre: 𝒱
//!     strike: ≈
//!     other leaves: •
//!     other branches: ○

use crate::minimark::token::{Token, TokenContent};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn get_icon(token: &Token) -> &'static str {
    match token.kind() {
        "word" => "◦",
        "bold" => "𝐁",
        "italic" => "𝐼",
        "code" => "ƒ",
        "pre" => "𝒱",
        "strike" => "≈",
        _ if token.is_leaf() => "•",
        _ => "○",
    }
}

fn format_token(token: &Token, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(token);

    match &token.content {
        TokenContent::Text(text) => {
            output.push_str(&format!(
                "{}{} {} {} {:?}\n",
                prefix,
                connector,
                icon,
                token.kind,
                truncate(text, 30)
            ));
        }
        TokenContent::Children(children) => {
            output.push_str(&format!("{}{} {} {}\n", prefix, connector, icon, token.kind));
            let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
            format_tokens(children, &child_prefix, output);
        }
    }
}

fn format_tokens(tokens: &[Token], prefix: &str, output: &mut String) {
    for (i, token) in tokens.iter().enumerate() {
        format_token(token, prefix, i == tokens.len() - 1, output);
    }
}

/// Render a token sequence as a treeviz string.
pub fn to_treeviz_str(tokens: &[Token]) -> String {
    let mut output = String::new();
    format_tokens(tokens, "", &mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minimark::grammar::defaults::default_grammar;
    use crate::minimark::testing::{branch, word};
    use crate::minimark::tokenizer::tokenize;

    #[test]
    fn renders_leaves_and_branches() {
        let tokens = vec![word("ola "), branch("bold", vec![word("k ase")])];
        assert_eq!(
            to_treeviz_str(&tokens),
            "├─ ◦ word \"ola \"\n└─ 𝐁 bold\n  └─ ◦ word \"k ase\"\n"
        );
    }

    #[test]
    fn truncates_long_text() {
        let tokens = vec![word("abcdefghijklmnopqrstuvwxyz0123456789")];
        assert_eq!(
            to_treeviz_str(&tokens),
            "└─ ◦ word \"abcdefghijklmnopqrstuvwxyz0123...\"\n"
        );
    }

    #[test]
    fn empty_sequence_renders_nothing() {
        assert_eq!(to_treeviz_str(&[]), "");
    }

    #[test]
    fn snapshot_mixed_markup() {
        let tokens = tokenize(
            "*hey* have ~how *amazing* this~ ```may *this* work?```",
            default_grammar(),
        );
        insta::assert_snapshot!(to_treeviz_str(&tokens).trim_end(), @r###"
        ├─ 𝐁 bold
        │ └─ ◦ word "hey"
        ├─ ◦ word " have "
        ├─ ≈ strike
        │ ├─ ◦ word "how "
        │ ├─ 𝐁 bold
        │ │ └─ ◦ word "amazing"
        │ └─ ◦ word " this"
        ├─ ◦ word " "
        └─ 𝒱 pre
          └─ ◦ word "may *this* work?"
        "###);
    }
}
