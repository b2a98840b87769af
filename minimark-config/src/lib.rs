//! Shared configuration loader for minimark.
//!
//! `defaults/minimark.default.toml` is embedded into every build so that the documented
//! defaults and the runtime behavior stay in sync. Applications layer user files on top of
//! those defaults via [`Loader`] before deserializing into [`MinimarkConfig`], which then
//! yields the [`Grammar`] and [`TokenizerOptions`] to tokenize with.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use minimark::minimark::grammar::constraints;
use minimark::{Grammar, GrammarError, TokenType, TokenizerOptions};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../defaults/minimark.default.toml");

/// Errors raised while loading configuration or building its grammar.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("`{kind}` refers to `{reference}`, which is not declared before it")]
    UnknownKind { kind: String, reference: String },
    #[error("invalid pattern for `{kind}`")]
    InvalidPattern {
        kind: String,
        #[source]
        source: regex::Error,
    },
    #[error("`{kind}`: {reason}")]
    Conflicting { kind: String, reason: &'static str },
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MinimarkConfig {
    pub tokenizer: TokenizerConfig,
    pub grammar: GrammarConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub max_depth: usize,
}

/// Token type declarations, in priority order.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    #[serde(default)]
    pub types: Vec<TokenTypeConfig>,
}

/// One `[[grammar.types]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenTypeConfig {
    pub kind: String,
    pub surround: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Kinds making up the interior grammar of a branch.
    pub grammar: Option<Vec<String>>,
    #[serde(default)]
    pub verbatim: bool,
    pub pattern: Option<String>,
    pub literals: Option<Vec<String>>,
}

impl MinimarkConfig {
    pub fn options(&self) -> TokenizerOptions {
        TokenizerOptions {
            max_depth: self.tokenizer.max_depth,
        }
    }

    /// Build the declared token types into a validated grammar.
    pub fn grammar(&self) -> Result<Grammar, LoadError> {
        let mut declared: Vec<TokenType> = Vec::with_capacity(self.grammar.types.len());
        for entry in &self.grammar.types {
            let token_type = entry.build(&declared)?;
            declared.push(token_type);
        }
        log::debug!("built grammar with {} token types", declared.len());
        Ok(Grammar::new(declared)?)
    }
}

impl TokenTypeConfig {
    fn build(&self, declared: &[TokenType]) -> Result<TokenType, LoadError> {
        let kind = self.kind.as_str();
        let conflict = |reason| LoadError::Conflicting {
            kind: kind.to_string(),
            reason,
        };

        let branch = match (&self.surround, &self.start, &self.end) {
            (Some(marker), None, None) => Some(TokenType::surround(kind, marker.as_str())),
            (None, Some(start), Some(end)) => {
                Some(TokenType::delimited(kind, start.as_str(), end.as_str()))
            }
            (None, None, None) => None,
            (Some(_), _, _) => return Err(conflict("`surround` excludes `start` and `end`")),
            (None, _, _) => return Err(conflict("`start` and `end` must be set together")),
        };

        match branch {
            Some(branch) => {
                if self.pattern.is_some() || self.literals.is_some() {
                    return Err(conflict("branch types take no `pattern` or `literals`"));
                }
                match (&self.grammar, self.verbatim) {
                    (Some(_), true) => Err(conflict("`verbatim` excludes `grammar`")),
                    (Some(kinds), false) => {
                        let inner = resolve(kind, kinds, declared)?;
                        Ok(branch.with_grammar(inner))
                    }
                    (None, true) => Ok(branch.with_grammar(Grammar::empty())),
                    (None, false) => Ok(branch),
                }
            }
            None => {
                if self.grammar.is_some() || self.verbatim {
                    return Err(conflict("leaf types have no interior grammar"));
                }
                match (&self.pattern, &self.literals) {
                    (Some(pattern), None) => {
                        let constraint = constraints::pattern(pattern).map_err(|source| {
                            LoadError::InvalidPattern {
                                kind: kind.to_string(),
                                source,
                            }
                        })?;
                        Ok(TokenType::constrained(kind, constraint))
                    }
                    (None, Some(literals)) => Ok(TokenType::constrained(
                        kind,
                        constraints::literals(literals.iter().cloned()),
                    )),
                    (None, None) => Ok(TokenType::leaf(kind)),
                    (Some(_), Some(_)) => Err(conflict("`pattern` excludes `literals`")),
                }
            }
        }
    }
}

fn resolve(kind: &str, kinds: &[String], declared: &[TokenType]) -> Result<Grammar, LoadError> {
    let types = kinds
        .iter()
        .map(|reference| {
            declared
                .iter()
                .find(|t| t.kind() == reference.as_str())
                .cloned()
                .ok_or_else(|| LoadError::UnknownKind {
                    kind: kind.to_string(),
                    reference: reference.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Grammar::new(types)?)
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML held in memory.
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MinimarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MinimarkConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minimark::minimark::formats::detokenize;
    use minimark::minimark::grammar::defaults::default_types;
    use minimark::minimark::testing::{branch, leaf, word};
    use minimark::{default_grammar, Tokenizer};
    use rstest::rstest;
    use std::io::Write;

    fn entry(kind: &str) -> TokenTypeConfig {
        TokenTypeConfig {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.tokenizer.max_depth, minimark::minimark::DEFAULT_MAX_DEPTH);
        assert_eq!(config.options(), TokenizerOptions::default());
        assert_eq!(config.grammar.types.len(), 5);
    }

    #[test]
    fn default_config_matches_builtin_grammar() {
        let grammar = load_defaults().unwrap().grammar().unwrap();
        let builtin = default_types();
        assert_eq!(grammar.len(), builtin.len());
        for (loaded, expected) in grammar.iter().zip(&builtin) {
            assert_eq!(loaded.kind(), expected.kind());
            assert_eq!(loaded.start(), expected.start());
            assert_eq!(loaded.end(), expected.end());
            assert_eq!(
                loaded.inner_grammar().map(Grammar::len),
                expected.inner_grammar().map(Grammar::len)
            );
        }

        let source = "*hey* ~how *amazing*~ ```may *this* work?```";
        assert_eq!(
            Tokenizer::new(&grammar).tokenize(source),
            Tokenizer::new(default_grammar()).tokenize(source)
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("tokenizer.max_depth", 2i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.options().max_depth, 2);
    }

    #[test]
    fn layered_toml_replaces_types() {
        let config = Loader::new()
            .with_toml_str(
                r#"
                [[grammar.types]]
                kind = "link"
                pattern = "https?://[a-z.]+"

                [[grammar.types]]
                kind = "label-link"
                start = "<"
                end = ">"
                grammar = ["link"]

                [[grammar.types]]
                kind = "emoji"
                literals = [":+1:", ":trollface:"]
                "#,
            )
            .build()
            .expect("config to build");
        assert_eq!(config.tokenizer.max_depth, 64);

        let grammar = config.grammar().expect("grammar to build");
        let tokens = Tokenizer::new(&grammar).tokenize("ola <http://google.com|lol> :+1:");
        assert_eq!(
            tokens,
            vec![
                word("ola "),
                branch(
                    "label-link",
                    vec![leaf("link", "http://google.com"), word("|lol")]
                ),
                word(" "),
                leaf("emoji", ":+1:"),
            ]
        );
        assert_eq!(
            detokenize(&tokens, &grammar),
            "ola <http://google.com|lol> :+1:"
        );
    }

    #[test]
    fn reads_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tokenizer]\nmax_depth = 3").unwrap();
        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.tokenizer.max_depth, 3);
        assert_eq!(config.grammar.types.len(), 5);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Loader::new()
            .with_file(dir.path().join("absent.toml"))
            .build()
            .is_err());
        assert!(Loader::new()
            .with_optional_file(dir.path().join("absent.toml"))
            .build()
            .is_ok());
    }

    #[rstest]
    #[case::surround_and_start(TokenTypeConfig {
        surround: Some("*".into()),
        start: Some("<".into()),
        ..entry("x")
    })]
    #[case::start_without_end(TokenTypeConfig { start: Some("<".into()), ..entry("x") })]
    #[case::branch_with_pattern(TokenTypeConfig {
        surround: Some("*".into()),
        pattern: Some("a".into()),
        ..entry("x")
    })]
    #[case::verbatim_and_grammar(TokenTypeConfig {
        surround: Some("*".into()),
        verbatim: true,
        grammar: Some(vec![]),
        ..entry("x")
    })]
    #[case::leaf_with_grammar(TokenTypeConfig { grammar: Some(vec![]), ..entry("x") })]
    #[case::pattern_and_literals(TokenTypeConfig {
        pattern: Some("a".into()),
        literals: Some(vec!["a".into()]),
        ..entry("x")
    })]
    fn conflicting_entries_are_rejected(#[case] entry: TokenTypeConfig) {
        assert!(matches!(
            entry.build(&[]),
            Err(LoadError::Conflicting { .. })
        ));
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let entry = TokenTypeConfig {
            surround: Some("*".into()),
            grammar: Some(vec!["link".into()]),
            ..entry("bold")
        };
        match entry.build(&[]) {
            Err(LoadError::UnknownKind { kind, reference }) => {
                assert_eq!(kind, "bold");
                assert_eq!(reference, "link");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let entry = TokenTypeConfig {
            pattern: Some("(".into()),
            ..entry("broken")
        };
        assert!(matches!(
            entry.build(&[]),
            Err(LoadError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn grammar_errors_surface() {
        let config = MinimarkConfig {
            tokenizer: TokenizerConfig { max_depth: 4 },
            grammar: GrammarConfig {
                types: vec![entry("dup"), entry("dup")],
            },
        };
        assert!(matches!(
            config.grammar(),
            Err(LoadError::Grammar(GrammarError::DuplicateKind(_)))
        ));
    }
}
