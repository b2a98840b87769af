//! Token tree produced by the tokenizer
//!
//! A token is either a leaf holding the literal text it covers, or a branch holding the
//! tokens found between its delimiters. Branches own their children; there are no back
//! references, so the tree is a plain owned value that can be cloned, compared and
//! serialized.
//!
//! Serialized shape (JSON):
//!
//!     {"type": "word", "text": "ola "}
//!     {"type": "bold", "children": [{"type": "word", "text": "k ase"}]}
//!
//! Reading that shape back only accepts what the tokenizer can produce: exactly one of
//! `text` and `children`, neither of them empty, and no other fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sequence of tokens, as returned by the tokenizer and held by branches.
pub type Tokens = Vec<Token>;

/// A single node of the token tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawToken")]
pub struct Token {
    /// Kind copied from the token type that produced this token.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub content: TokenContent,
}

/// Payload of a token: literal text for leaves, children for branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenContent {
    Text(String),
    Children(Tokens),
}

/// Serialized token before its payload has been checked.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawToken {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
    children: Option<Tokens>,
}

#[derive(Debug, Error)]
enum ShapeError {
    #[error("token `{0}` has both `text` and `children`")]
    BothPayloads(String),
    #[error("token `{0}` has neither `text` nor `children`")]
    NoPayload(String),
    #[error("token `{0}` has an empty payload")]
    EmptyPayload(String),
}

impl TryFrom<RawToken> for Token {
    type Error = ShapeError;

    fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
        let content = match (raw.text, raw.children) {
            (Some(_), Some(_)) => return Err(ShapeError::BothPayloads(raw.kind)),
            (None, None) => return Err(ShapeError::NoPayload(raw.kind)),
            (Some(text), None) if !text.is_empty() => TokenContent::Text(text),
            (None, Some(children)) if !children.is_empty() => TokenContent::Children(children),
            _ => return Err(ShapeError::EmptyPayload(raw.kind)),
        };
        Ok(Self {
            kind: raw.kind,
            content,
        })
    }
}

impl Token {
    pub fn leaf(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: TokenContent::Text(text.into()),
        }
    }

    pub fn branch(kind: impl Into<String>, children: Tokens) -> Self {
        Self {
            kind: kind.into(),
            content: TokenContent::Children(children),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, TokenContent::Text(_))
    }

    /// Literal text of a leaf token.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TokenContent::Text(text) => Some(text),
            TokenContent::Children(_) => None,
        }
    }

    /// Children of a branch token.
    pub fn children(&self) -> Option<&[Token]> {
        match &self.content {
            TokenContent::Text(_) => None,
            TokenContent::Children(children) => Some(children),
        }
    }

    /// Concatenated text of every leaf below this token, delimiters excluded.
    ///
    /// This is not the source text: markup consumed by branches is gone. Use
    /// [detokenize](crate::minimark::formats::detokenize) to rebuild the source.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match &self.content {
            TokenContent::Text(text) => out.push_str(text),
            TokenContent::Children(children) => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }

    /// Visit this token and its descendants depth first, parents before children.
    ///
    /// The callback receives the nesting depth, starting at 0 for `self`.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&Token, usize),
    {
        self.walk_at(0, visit);
    }

    fn walk_at<F>(&self, depth: usize, visit: &mut F)
    where
        F: FnMut(&Token, usize),
    {
        visit(self, depth);
        if let TokenContent::Children(children) = &self.content {
            for child in children {
                child.walk_at(depth + 1, visit);
            }
        }
    }
}

/// Concatenated leaf text of a token sequence, see [Token::text_content].
pub fn text_content(tokens: &[Token]) -> String {
    tokens.iter().map(Token::text_content).collect()
}
