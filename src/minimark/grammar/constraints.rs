//! Stock constraints for leaf token types
//!
//! Any `Fn(&str) -> Option<usize>` works as a constraint; these cover the usual cases of
//! custom grammars: a regular expression anchored at the current position, a fixed set of
//! literals (emoji codes), and bare URLs.

use super::Constraint;
use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.-]+(?::[0-9]+)?(?:/[A-Za-z0-9._~%/?#=&+-]*)?")
        .expect("URL pattern is valid")
});

/// Match `pattern` at the current position only.
///
/// The pattern is anchored, so `[a-z]+` never skips ahead to a later word. Empty matches
/// count as no match.
pub fn pattern(pattern: &str) -> Result<Constraint, regex::Error> {
    let regex = Regex::new(&format!("^(?:{})", pattern))?;
    Ok(from_regex(regex))
}

fn from_regex(regex: Regex) -> Constraint {
    Constraint::new(move |text: &str| {
        regex
            .find(text)
            .map(|m| m.end())
            .filter(|&length| length > 0)
    })
}

/// Match the first of `literals` the remaining text starts with, in the given order.
pub fn literals<I, S>(literals: I) -> Constraint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let literals: Vec<String> = literals
        .into_iter()
        .map(Into::into)
        .filter(|literal| !literal.is_empty())
        .collect();
    Constraint::new(move |text: &str| {
        literals
            .iter()
            .find(|literal| text.starts_with(literal.as_str()))
            .map(String::len)
    })
}

/// Match an `http` or `https` URL.
pub fn url() -> Constraint {
    Constraint::new(|text: &str| URL.find(text).map(|m| m.end()))
}
