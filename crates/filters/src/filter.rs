use std::fmt;

use regex::Regex;

use crate::FilterError;

/// Compiled snapshot-name predicate.
#[derive(Clone)]
pub struct SnapshotFilter {
    pattern: String,
    regex: Regex,
}

impl SnapshotFilter {
    /// Compiles `pattern` into a filter.
    pub fn new(pattern: impl Into<String>) -> Result<Self, FilterError> {
        let pattern = pattern.into();
        match Regex::new(&pattern) {
            Ok(regex) => Ok(Self { pattern, regex }),
            Err(error) => Err(FilterError::new(pattern, error)),
        }
    }

    /// Returns the pattern text the filter was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Reports whether `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Splits `names` into `(matching, excluded)` while preserving order.
    pub fn partition<'a, I>(&self, names: I) -> (Vec<&'a str>, Vec<&'a str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().partition(|name| self.matches(name))
    }
}

impl fmt::Debug for SnapshotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotFilter")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl fmt::Display for SnapshotFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl PartialEq for SnapshotFilter {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for SnapshotFilter {}

/// Evaluates an optional filter; an absent filter matches every name.
#[must_use]
pub fn allows(filter: Option<&SnapshotFilter>, name: &str) -> bool {
    filter.is_none_or(|filter| filter.matches(name))
}
