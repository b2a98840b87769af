//! Tokenizer engine
//!
//!     The tokenizer walks the input once, one character at a time. At every position it asks
//!     the grammar (in priority order, `word` last) which type matches the remaining text,
//!     then:
//!
//!         1. Same type as the leaf being accumulated: extend the leaf.
//!         2. The branch whose interior this scan is resolving: its closing delimiter was
//!            found, so finish the pending leaf and hand the tokens back. The delimiter is
//!            left for the caller to consume.
//!         3. Another leaf type: finish the pending leaf and start a new one here. A match
//!            longer than the current character (a link, an emoji) becomes a token of exactly
//!            that length right away.
//!         4. A branch type: tokenize the text after its opening delimiter with a nested scan
//!            that watches for the closing delimiter. If that scan runs out of input, or closes
//!            without producing anything, the branch is abandoned and the character is kept
//!            as word text.
//!
//!     A nested scan that reaches the end of its input without finding its closing delimiter
//!     reports the branch as unclosed. Unclosed markup is never an error: its delimiters end
//!     up inside word tokens, so concatenating every token (with branch delimiters put back)
//!     always reproduces the input. See [detokenize](crate::minimark::formats::detokenize).
//!
//!     Nesting depth is bounded by [TokenizerOptions::max_depth]; a branch that would nest
//!     deeper is treated as unclosed.
//!
//!     The outcome of a nested scan only depends on where it starts, the branch it resolves,
//!     the grammar it uses and its depth. Outcomes are remembered for the duration of one
//!     call, so markup that keeps failing to close (`*_*_*_...`) costs polynomial rather than
//!     exponential time. Grammars are told apart by the path of branch kinds whose inner
//!     grammars led to them, and branches by kind, which is unique within each grammar.

use crate::minimark::grammar::{Grammar, Match, TokenType};
use crate::minimark::token::{Token, Tokens};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter;

/// Nesting depth allowed by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

static WORD_TYPE: Lazy<TokenType> = Lazy::new(TokenType::word);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Deepest branch nesting accepted. `0` disables branches altogether.
    pub max_depth: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Tokenizes text against a grammar.
///
/// The tokenizer holds no per-input state, so one instance can be reused for any number of
/// inputs.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'g> {
    grammar: &'g Grammar,
    options: TokenizerOptions,
}

impl<'g> Tokenizer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            options: TokenizerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> TokenizerOptions {
        self.options
    }

    pub fn tokenize(&self, text: &str) -> Tokens {
        let rules = self.grammar.iter().collect();
        let scan = Scan {
            rules,
            max_depth: self.options.max_depth,
            ..Scan::new(text, 0)
        };
        match scan.run(&mut Attempts::default()) {
            Some(closed) => closed.tokens,
            // Only nested scans report unclosed branches.
            None => Vec::new(),
        }
    }
}

/// Tokenize `text` with `grammar` and the default options.
pub fn tokenize(text: &str, grammar: &Grammar) -> Tokens {
    Tokenizer::new(grammar).tokenize(text)
}

/// Tokens of a finished scan and the bytes it consumed.
#[derive(Clone)]
struct Closed {
    tokens: Tokens,
    consumed: usize,
}

/// Identifies a nested scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Attempt<'g> {
    start: usize,
    /// Grammar the scan uses, see [Attempts::origin].
    origin: usize,
    /// Kind of the branch being resolved.
    context: &'g str,
    depth: usize,
}

/// Nested scan outcomes of one `tokenize` call.
#[derive(Default)]
struct Attempts<'g> {
    outcomes: HashMap<Attempt<'g>, Option<Closed>>,
    /// (parent grammar, branch kind) to the index of that branch's inner grammar.
    origins: HashMap<(usize, &'g str), usize>,
}

impl<'g> Attempts<'g> {
    /// Index of the inner grammar of branch `kind` reached from grammar `parent`. The top
    /// grammar is `0`.
    fn origin(&mut self, parent: usize, kind: &'g str) -> usize {
        let next = self.origins.len() + 1;
        *self.origins.entry((parent, kind)).or_insert(next)
    }
}

/// State of one scan: the whole input at the top level, or one branch interior.
struct Scan<'t, 'g> {
    text: &'t str,
    /// Offset of `text` in the input handed to [Tokenizer::tokenize].
    base: usize,
    /// Grammar for this level, without the word fallback.
    rules: Vec<&'g TokenType>,
    /// Index of the grammar `rules` was built from; `0` for the top grammar.
    origin: usize,
    /// Branch whose closing delimiter this scan is watching for.
    context: Option<&'g TokenType>,
    depth: usize,
    max_depth: usize,
    offset: usize,
    span_start: usize,
    current: Option<&'g TokenType>,
    tokens: Tokens,
}

impl<'t, 'g> Scan<'t, 'g> {
    fn new(text: &'t str, base: usize) -> Self {
        Self {
            text,
            base,
            rules: Vec::new(),
            origin: 0,
            context: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            offset: 0,
            span_start: 0,
            current: None,
            tokens: Vec::new(),
        }
    }

    /// Returns `None` when this is a nested scan and its closing delimiter never showed up.
    fn run(mut self, attempts: &mut Attempts<'g>) -> Option<Closed> {
        while let Some(ch) = self.text[self.offset..].chars().next() {
            let step = ch.len_utf8();
            let found = self.next_match(step);
            let token_type = found.token_type;

            if self.current.is_some_and(|current| current.is_same_kind(token_type)) {
                // extend
            } else if self.context.is_some_and(|context| context.is_same_kind(token_type)) {
                self.finish_leaf();
                return Some(Closed {
                    tokens: self.tokens,
                    consumed: self.offset,
                });
            } else if token_type.is_leaf() {
                self.start_leaf(token_type);
                if found.length > step {
                    self.offset += found.length;
                    self.finish_leaf();
                    continue;
                }
            } else if let Some(advance) = self.open_branch(token_type, attempts) {
                self.offset += advance;
                continue;
            } else {
                self.absorb_as_word();
            }

            self.offset += step;
        }

        if let Some(context) = self.context {
            log::trace!(
                "`{}` not closed before end of input at depth {}",
                context.kind(),
                self.depth
            );
            return None;
        }

        self.finish_leaf();
        Some(Closed {
            tokens: self.tokens,
            consumed: self.offset,
        })
    }

    /// First type in priority order matching at the current offset, `word` if none does.
    fn next_match(&self, step: usize) -> Match<'g> {
        let remaining = &self.text[self.offset..];
        let context = self.context;
        self.rules
            .iter()
            .copied()
            .find_map(|token_type| token_type.matches(context, remaining))
            .unwrap_or(Match {
                token_type: &WORD_TYPE,
                length: step,
            })
    }

    fn start_leaf(&mut self, token_type: &'g TokenType) {
        self.finish_leaf();
        self.span_start = self.offset;
        self.current = Some(token_type);
    }

    fn finish_leaf(&mut self) {
        if let Some(token_type) = self.current.take() {
            if self.span_start < self.offset {
                let text = &self.text[self.span_start..self.offset];
                self.tokens.push(Token::leaf(token_type.kind(), text));
            }
        }
    }

    /// Keep the character at the current offset as plain text.
    fn absorb_as_word(&mut self) {
        let word: &'g TokenType = &WORD_TYPE;
        if !self.current.is_some_and(|current| current.is_same_kind(word)) {
            self.start_leaf(word);
        }
    }

    /// Try to open `token_type` at the current offset.
    ///
    /// On success the branch token is pushed and the number of bytes covered (both
    /// delimiters included) is returned.
    fn open_branch(
        &mut self,
        token_type: &'g TokenType,
        attempts: &mut Attempts<'g>,
    ) -> Option<usize> {
        let (start, end) = (token_type.start()?, token_type.end()?);
        let interior_start = self.offset + start.len();
        let interior = &self.text[interior_start..];
        if interior.is_empty() {
            return None;
        }
        if self.depth >= self.max_depth {
            log::debug!(
                "not opening `{}` at byte {}: nesting limit {} reached",
                token_type.kind(),
                self.base + self.offset,
                self.max_depth
            );
            return None;
        }

        let (rules, origin) = match token_type.inner_grammar() {
            Some(inner) => (
                iter::once(token_type).chain(inner.iter()).collect(),
                attempts.origin(self.origin, token_type.kind()),
            ),
            None => (self.rules.clone(), self.origin),
        };
        let attempt = Attempt {
            start: self.base + interior_start,
            origin,
            context: token_type.kind(),
            depth: self.depth + 1,
        };
        let outcome = match attempts.outcomes.get(&attempt) {
            Some(outcome) => outcome.clone(),
            None => {
                let nested = Scan {
                    rules,
                    origin,
                    context: Some(token_type),
                    depth: self.depth + 1,
                    max_depth: self.max_depth,
                    ..Scan::new(interior, attempt.start)
                };
                let outcome = nested.run(attempts);
                attempts.outcomes.insert(attempt, outcome.clone());
                outcome
            }
        };
        let closed = outcome?;
        if closed.tokens.is_empty() {
            log::trace!(
                "dropping empty `{}` at byte {}",
                token_type.kind(),
                self.base + self.offset
            );
            return None;
        }

        self.finish_leaf();
        self.tokens.push(Token::branch(token_type.kind(), closed.tokens));
        Some(start.len() + closed.consumed + end.len())
    }
}
