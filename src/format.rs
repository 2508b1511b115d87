//! Format detection and the delimiter strategy table.
//!
//! A *format identifier* is a short lowercase token such as `csv`, `psv`, or
//! `ssv`. It is derived either from a file path's extension or from the
//! subtype of an HTTP `Content-Type` header, and it selects the
//! [`DelimiterStrategy`] used to split each line into raw fields.
//!
//! Detection never looks at content; it only classifies.
//!
//! # Built-in formats
//!
//! | Identifier | Split rule |
//! |------------|------------|
//! | `csv` | literal `,` |
//! | `psv` | literal `\|` |
//! | `ssv` | runs of whitespace |
//!
//! New formats are added with [`DelimiterTable::register`].

use std::fmt;
use std::path::Path;

use crate::error::{Result, RosterError};

pub const FORMAT_CSV: &str = "csv";
pub const FORMAT_PSV: &str = "psv";
pub const FORMAT_SSV: &str = "ssv";

/// The only media type accepted on the request-body path.
const TEXT_MEDIA_TYPE: &str = "text";

/// Derives a format identifier from a file path.
///
/// The identifier is everything after the final `.` of the path, lowercased.
/// A path without any `.` yields the whole path, which will simply fail to
/// resolve against the table.
pub fn identifier_from_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    let ext = match text.rfind('.') {
        Some(pos) => &text[pos + 1..],
        None => &text[..],
    };
    ext.to_lowercase()
}

/// Derives a format identifier from an HTTP `Content-Type` header value.
///
/// Parameters after `;` are dropped, the remainder must be exactly
/// `type/subtype`, and `type` must be `text`. The identifier is the
/// lowercased subtype, e.g. `text/csv; charset=utf-8` yields `csv`.
pub fn identifier_from_content_type(header: Option<&str>) -> Result<String> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(RosterError::MissingContentType)?;

    let essence = header.split(';').next().unwrap_or_default();
    let parts: Vec<&str> = essence.split('/').map(str::trim).collect();
    let [media_type, subtype] = parts.as_slice() else {
        return Err(RosterError::MalformedContentType(header.to_string()));
    };
    if media_type.is_empty() || subtype.is_empty() {
        return Err(RosterError::MalformedContentType(header.to_string()));
    }
    if !media_type.eq_ignore_ascii_case(TEXT_MEDIA_TYPE) {
        return Err(RosterError::UnsupportedContentType(header.to_string()));
    }

    Ok(subtype.to_lowercase())
}

/// Line-splitting function backing a [`DelimiterStrategy`].
pub type SplitFn = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// A stateless rule that splits one line into raw (untrimmed) fields.
pub struct DelimiterStrategy {
    identifier: String,
    split: Box<SplitFn>,
}

impl DelimiterStrategy {
    /// Creates a strategy from an arbitrary split function.
    pub fn new<F>(identifier: impl Into<String>, split: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            identifier: identifier.into().to_lowercase(),
            split: Box::new(split),
        }
    }

    /// Splits on a literal delimiter character.
    ///
    /// Trailing empty fields are dropped, so `a,b,c,d,e,` still has five
    /// fields. Interior empty fields are kept and later fail validation.
    pub fn char_separated(identifier: impl Into<String>, delimiter: char) -> Self {
        Self::new(identifier, move |line: &str| {
            let mut fields: Vec<String> = line.split(delimiter).map(str::to_string).collect();
            while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }
            fields
        })
    }

    /// Splits on runs of whitespace.
    pub fn whitespace_separated(identifier: impl Into<String>) -> Self {
        Self::new(identifier, |line: &str| {
            line.split_whitespace().map(str::to_string).collect()
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Splits one line into its raw field array.
    pub fn read(&self, line: &str) -> Vec<String> {
        (self.split)(line)
    }
}

impl fmt::Debug for DelimiterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimiterStrategy")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Maps format identifiers to delimiter strategies.
#[derive(Debug)]
pub struct DelimiterTable {
    strategies: Vec<DelimiterStrategy>,
}

impl DelimiterTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Create a table pre-loaded with `csv`, `psv`, and `ssv`.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(DelimiterStrategy::char_separated(FORMAT_CSV, ','));
        table.register(DelimiterStrategy::char_separated(FORMAT_PSV, '|'));
        table.register(DelimiterStrategy::whitespace_separated(FORMAT_SSV));
        table
    }

    /// Register a strategy, replacing any existing one with the same identifier.
    pub fn register(&mut self, strategy: DelimiterStrategy) {
        self.strategies
            .retain(|s| s.identifier() != strategy.identifier());
        self.strategies.push(strategy);
    }

    /// Whether a strategy exists for `identifier`.
    pub fn can_handle(&self, identifier: &str) -> bool {
        self.find(identifier).is_some()
    }

    /// Find a strategy by identifier.
    pub fn find(&self, identifier: &str) -> Option<&DelimiterStrategy> {
        self.strategies
            .iter()
            .find(|s| s.identifier().eq_ignore_ascii_case(identifier))
    }

    /// Find a strategy by identifier, failing with `UnsupportedFormat`.
    pub fn resolve(&self, identifier: &str) -> Result<&DelimiterStrategy> {
        self.find(identifier)
            .ok_or_else(|| RosterError::UnsupportedFormat {
                identifier: identifier.to_string(),
                supported: self.identifiers().join(", "),
            })
    }

    /// Registered identifiers in registration order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.identifier()).collect()
    }
}

impl Default for DelimiterTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}
