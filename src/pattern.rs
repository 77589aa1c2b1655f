//! Depth-indexed match/substitute patterns.
//!
//! Pattern `n` governs every entry at traversal depth `n`, regardless of lineage.
//! Depths past the end of the list have no pattern at all.

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::PatternError;
use crate::types::Verdict;

/// Tokens that mean "match anything, keep the name".
const WILDCARD_TOKENS: [&str; 2] = ["", "_"];

/// Case-insensitivity flag prepended to every expression.
const CASE_INSENSITIVE: &str = "(?i)";

/// One pattern: an optional case-insensitive expression plus an optional substitution template.
///
/// A pattern without an expression is a wildcard (always [`Verdict::Matched`], name unchanged).
/// A substitution without an expression is rejected at construction.
#[derive(Clone, Debug, Default)]
pub struct Pattern {
    expression: Option<Regex>,
    substitution: Option<String>,
}

impl Pattern {
    /// Wildcard pattern: matches everything, renames nothing.
    pub fn wildcard() -> Self {
        Self::default()
    }

    /// Build a pattern from its parts. The expression is compiled case-insensitively.
    pub fn new(expression: Option<&str>, substitution: Option<&str>) -> Result<Self, PatternError> {
        let expression = expression.filter(|e| !e.is_empty());
        let substitution = substitution.map(str::to_string);
        match (expression, substitution) {
            (None, Some(substitution)) => {
                Err(PatternError::SubstitutionWithoutExpression { substitution })
            }
            (None, None) => Ok(Self::wildcard()),
            (Some(exp), substitution) => Ok(Self {
                expression: Some(compile_regex(exp)?),
                substitution,
            }),
        }
    }

    /// Parse `exp`, `exp/sub`, or a wildcard token (`""` / `"_"`).
    ///
    /// The first `/` separates expression from substitution; later slashes belong to the substitution.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        if WILDCARD_TOKENS.contains(&text) {
            return Ok(Self::wildcard());
        }
        match text.split_once('/') {
            Some((_, "")) => Err(PatternError::EmptySubstitution {
                pattern: text.to_string(),
            }),
            Some((exp, sub)) => Self::new(Some(exp), Some(sub)),
            None => Self::new(Some(text), None),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.expression.is_none()
    }

    pub fn expression(&self) -> Option<&Regex> {
        self.expression.as_ref()
    }

    pub fn substitution(&self) -> Option<&str> {
        self.substitution.as_deref()
    }

    /// Apply this pattern to one name.
    pub fn apply(&self, name: &str) -> (Verdict, String) {
        let Some(exp) = &self.expression else {
            return (Verdict::Matched, name.to_string());
        };
        if !exp.is_match(name) {
            return (Verdict::NotMatched, name.to_string());
        }
        let new_name = match &self.substitution {
            Some(sub) => exp.replace_all(name, sub.as_str()).into_owned(),
            None => name.to_string(),
        };
        (Verdict::Matched, new_name)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.expression, &self.substitution) {
            (None, _) => write!(f, "*"),
            (Some(exp), None) => write!(f, "{}", exp),
            (Some(exp), Some(sub)) => write!(f, "{} / {}", exp, sub),
        }
    }
}

/// Classify `name` at `depth` using the pattern for that depth.
///
/// Depths without a pattern yield [`Verdict::NoPattern`] and the unchanged name.
pub fn apply_pattern(patterns: &[Pattern], depth: usize, name: &str) -> (Verdict, String) {
    match patterns.get(depth) {
        Some(pattern) => pattern.apply(name),
        None => (Verdict::NoPattern, name.to_string()),
    }
}

/// Parse every pattern string, failing on the first invalid one.
pub fn parse_patterns<S: AsRef<str>>(texts: &[S]) -> Result<Vec<Pattern>, PatternError> {
    texts.iter().map(|t| Pattern::parse(t.as_ref())).collect()
}

fn compile_regex(exp: &str) -> Result<Regex, PatternError> {
    let source = if exp.starts_with(CASE_INSENSITIVE) {
        exp.to_string()
    } else {
        format!("{CASE_INSENSITIVE}{exp}")
    };
    Regex::new(&source).map_err(|source_err| PatternError::InvalidExpression {
        expression: source,
        source: source_err,
    })
}
