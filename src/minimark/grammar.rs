//! Token types and grammars
//!
//!     A grammar is an ordered list of token types. Order is priority: at every position the
//!     tokenizer asks each type in turn whether it matches the remaining text, and the first
//!     one that does wins. There is no longest-match rule, so more specific types (a link
//!     pattern) must come before more general ones.
//!
//!     Token types come in two shapes:
//!
//!         - Leaf types produce tokens holding literal text. A leaf either has a
//!           [Constraint] that measures a match at the current position (links, emoji), or has
//!           none and matches any single character. The synthetic `word` type is such a leaf
//!           and is always tried last, so something matches at every position.
//!         - Branch types are bounded by a start and an end delimiter (equal for surround
//!           markers such as `*bold*`) and produce tokens holding the tokens found between
//!           them. The interior is tokenized with the branch's own inner grammar, or with the
//!           enclosing grammar when it declares none.
//!
//!     Whether a branch type matches its start or its end depends on the context: inside a
//!     branch of the same kind the tokenizer is looking for the closing delimiter, anywhere
//!     else for the opening one. Kinds are compared by name, which is why a grammar may not
//!     declare the same kind twice.

pub mod constraints;
pub mod defaults;

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Kind of the catch-all leaf appended to every grammar.
pub const WORD: &str = "word";

/// Errors raised while assembling a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("token type kind must not be empty")]
    EmptyKind,
    #[error("kind `{0}` is reserved for the catch-all word type")]
    ReservedKind(String),
    #[error("branch type `{0}` has an empty delimiter")]
    EmptyDelimiter(String),
    #[error("kind `{0}` is declared more than once in the same grammar")]
    DuplicateKind(String),
    #[error("branch type `{0}` declares its own kind in its inner grammar")]
    SelfNested(String),
}

type MeasureFn = dyn Fn(&str) -> Option<usize> + Send + Sync;

/// Measures an ad-hoc leaf match at the start of the remaining text.
///
/// The function returns the matched length in bytes, or `None` when nothing matches. Any
/// `Fn(&str) -> Option<usize>` can be used; see [constraints] for the stock ones.
#[derive(Clone)]
pub struct Constraint(Arc<MeasureFn>);

impl Constraint {
    pub fn new<F>(measure: F) -> Self
    where
        F: Fn(&str) -> Option<usize> + Send + Sync + 'static,
    {
        Self(Arc::new(measure))
    }

    pub fn measure(&self, text: &str) -> Option<usize> {
        (self.0)(text)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constraint(..)")
    }
}

impl<F> From<F> for Constraint
where
    F: Fn(&str) -> Option<usize> + Send + Sync + 'static,
{
    fn from(measure: F) -> Self {
        Constraint::new(measure)
    }
}

/// How a token type recognizes itself in the input.
#[derive(Debug, Clone)]
pub enum Matcher {
    Leaf {
        constraint: Option<Constraint>,
    },
    Branch {
        start: String,
        end: String,
        inner: Option<Grammar>,
    },
}

/// A successful match: which type matched and how many bytes it covers.
#[derive(Debug, Clone, Copy)]
pub struct Match<'g> {
    pub token_type: &'g TokenType,
    pub length: usize,
}

/// Declarative description of one kind of token.
#[derive(Debug, Clone)]
pub struct TokenType {
    kind: String,
    matcher: Matcher,
}

impl TokenType {
    /// Leaf matching any single character, extended while it keeps matching.
    pub fn leaf(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            matcher: Matcher::Leaf { constraint: None },
        }
    }

    /// Leaf recognized by a constraint.
    pub fn constrained(kind: impl Into<String>, constraint: impl Into<Constraint>) -> Self {
        Self {
            kind: kind.into(),
            matcher: Matcher::Leaf {
                constraint: Some(constraint.into()),
            },
        }
    }

    /// Branch opened and closed by the same marker, e.g. `*` for bold.
    pub fn surround(kind: impl Into<String>, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self::delimited(kind, marker.clone(), marker)
    }

    /// Branch with distinct opening and closing delimiters, e.g. `<` and `>`.
    pub fn delimited(
        kind: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            matcher: Matcher::Branch {
                start: start.into(),
                end: end.into(),
                inner: None,
            },
        }
    }

    /// Tokenize this branch's interior with `grammar` instead of the enclosing one.
    ///
    /// Has no effect on leaf types, which have no interior.
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        if let Matcher::Branch { inner, .. } = &mut self.matcher {
            *inner = Some(grammar);
        }
        self
    }

    /// The catch-all leaf the tokenizer falls back to.
    pub fn word() -> Self {
        Self::leaf(WORD)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.matcher, Matcher::Leaf { .. })
    }

    pub fn start(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Branch { start, .. } => Some(start),
            Matcher::Leaf { .. } => None,
        }
    }

    pub fn end(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Branch { end, .. } => Some(end),
            Matcher::Leaf { .. } => None,
        }
    }

    pub fn inner_grammar(&self) -> Option<&Grammar> {
        match &self.matcher {
            Matcher::Branch { inner, .. } => inner.as_ref(),
            Matcher::Leaf { .. } => None,
        }
    }

    pub fn is_same_kind(&self, other: &TokenType) -> bool {
        self.kind == other.kind
    }

    /// Does this type match at the start of `remaining`?
    ///
    /// `context` is the branch whose interior is being tokenized, if any. When it is this
    /// very type the closing delimiter is matched instead of the opening one.
    pub fn matches(&self, context: Option<&TokenType>, remaining: &str) -> Option<Match<'_>> {
        let length = match &self.matcher {
            Matcher::Leaf {
                constraint: Some(constraint),
            } => checked_length(&self.kind, remaining, constraint.measure(remaining)?)?,
            Matcher::Leaf { constraint: None } => remaining.chars().next()?.len_utf8(),
            Matcher::Branch { start, end, .. } => {
                let delimiter = if context.is_some_and(|c| self.is_same_kind(c)) {
                    end
                } else {
                    start
                };
                if !remaining.starts_with(delimiter.as_str()) {
                    return None;
                }
                delimiter.len()
            }
        };
        Some(Match {
            token_type: self,
            length,
        })
    }

    fn validate(&self) -> Result<(), GrammarError> {
        if self.kind.is_empty() {
            return Err(GrammarError::EmptyKind);
        }
        if self.kind == WORD {
            return Err(GrammarError::ReservedKind(self.kind.clone()));
        }
        if let Matcher::Branch { start, end, .. } = &self.matcher {
            if start.is_empty() || end.is_empty() {
                return Err(GrammarError::EmptyDelimiter(self.kind.clone()));
            }
        }
        // The interior is tokenized with this type followed by its inner grammar, and a
        // closing delimiter is recognized by kind: a second type of this kind in there would
        // close the branch with a delimiter that isn't its own. Deeper levels were checked
        // when their own grammars were built.
        if let Some(inner) = self.inner_grammar() {
            if inner.iter().any(|t| t.is_same_kind(self)) {
                return Err(GrammarError::SelfNested(self.kind.clone()));
            }
        }
        Ok(())
    }
}

/// A constraint's reported length must be non-zero and end on a char boundary inside `text`.
fn checked_length(kind: &str, text: &str, length: usize) -> Option<usize> {
    if length == 0 {
        return None;
    }
    if length > text.len() || !text.is_char_boundary(length) {
        log::warn!(
            "constraint for `{}` reported length {} which does not fit the remaining {} bytes",
            kind,
            length,
            text.len()
        );
        return None;
    }
    Some(length)
}

/// Ordered, validated list of token types.
///
/// The `word` fallback is not stored here; the tokenizer appends it.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    types: Vec<TokenType>,
}

impl Grammar {
    pub fn new(types: Vec<TokenType>) -> Result<Self, GrammarError> {
        for (i, token_type) in types.iter().enumerate() {
            token_type.validate()?;
            if types[..i].iter().any(|t| t.is_same_kind(token_type)) {
                return Err(GrammarError::DuplicateKind(token_type.kind.clone()));
            }
        }
        Ok(Self { types })
    }

    /// Grammar with no types: everything tokenizes as words.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &[TokenType] {
        &self.types
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Find a type by kind, searching inner grammars as well.
    pub fn find(&self, kind: &str) -> Option<&TokenType> {
        self.types.iter().find(|t| t.kind == kind).or_else(|| {
            self.types
                .iter()
                .filter_map(TokenType::inner_grammar)
                .find_map(|inner| inner.find(kind))
        })
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = &'a TokenType;
    type IntoIter = std::slice::Iter<'a, TokenType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
