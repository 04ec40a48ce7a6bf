//! ServerQuery line format.
//!
//! Responses are lines of `|`-separated records, each a space-separated list
//! of `key=value` properties (or a bare `key` for an empty value), followed
//! by a status line:
//!
//! ```text
//! virtualserver_id=1 virtualserver_port=9987 virtualserver_name=Lobby|virtualserver_id=2 ...
//! error id=0 msg=ok
//! ```
//!
//! Spaces, pipes, slashes, backslashes and control characters inside values
//! are backslash-escaped.

use std::collections::HashMap;
use std::str::FromStr;

use super::error::QueryError;

/// ServerQuery error id for "database empty result set".
pub const EMPTY_RESULT_SET: u32 = 1281;

/// Escape a value for use in a command or response.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            ' ' => out.push_str("\\s"),
            '|' => out.push_str("\\p"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0b' => out.push_str("\\v"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escape sequences keep the escaped character.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('p') => out.push('|'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0b'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// One decoded record: property name to unescaped value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(HashMap<String, String>);

impl Properties {
    /// Get a raw property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert a property, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a property, treating an absent or empty value as `Default`.
    pub fn parse_or_default<T>(&self, key: &str) -> Result<T, QueryError>
    where
        T: FromStr + Default,
    {
        match self.get(key) {
            None | Some("") => Ok(T::default()),
            Some(raw) => raw.parse().map_err(|_| {
                QueryError::Decode(format!("property '{}' has invalid value '{}'", key, raw))
            }),
        }
    }

    /// Parse a `0`/`1` flag; absent or empty is `false`.
    pub fn flag(&self, key: &str) -> Result<bool, QueryError> {
        match self.get(key) {
            None | Some("") | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(raw) => Err(QueryError::Decode(format!(
                "property '{}' is not a flag: '{}'",
                key, raw
            ))),
        }
    }

    /// Get a string property, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Properties(iter.into_iter().collect())
    }
}

/// Parse one data line into its records.
pub fn parse_records(line: &str) -> Vec<Properties> {
    line.split('|')
        .map(|record| {
            record
                .split(' ')
                .filter(|token| !token.is_empty())
                .map(|token| match token.split_once('=') {
                    Some((key, value)) => (key.to_string(), unescape(value)),
                    None => (token.to_string(), String::new()),
                })
                .collect()
        })
        .filter(|props: &Properties| !props.is_empty())
        .collect()
}

/// Status line closing every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Error id; 0 is success.
    pub id: u32,
    /// Human-readable message.
    pub message: String,
    /// Additional detail some errors carry.
    pub extra_message: Option<String>,
}

impl Status {
    /// Whether the command succeeded (including an empty result set).
    pub fn is_success(&self) -> bool {
        self.id == 0 || self.id == EMPTY_RESULT_SET
    }

    /// Convert a failure status into an error.
    pub fn into_result(self) -> Result<(), QueryError> {
        if self.is_success() {
            return Ok(());
        }
        let message = match self.extra_message {
            Some(extra) if !extra.is_empty() => format!("{} ({})", self.message, extra),
            _ => self.message,
        };
        Err(QueryError::Server {
            id: self.id,
            message,
        })
    }
}

/// Whether a line is the status line ending a response.
pub fn is_status_line(line: &str) -> bool {
    line == "error" || line.starts_with("error ")
}

/// Parse a status line (`error id=<n> msg=<text>`).
pub fn parse_status(line: &str) -> Result<Status, QueryError> {
    let rest = line
        .strip_prefix("error")
        .ok_or_else(|| QueryError::Protocol(format!("not a status line: '{}'", line)))?;

    let props = parse_records(rest.trim_start())
        .into_iter()
        .next()
        .unwrap_or_default();

    let id = match props.get("id") {
        Some(raw) => raw
            .parse()
            .map_err(|_| QueryError::Protocol(format!("invalid error id '{}'", raw)))?,
        None => return Err(QueryError::Protocol(format!("status line without id: '{}'", line))),
    };

    Ok(Status {
        id,
        message: props.text("msg"),
        extra_message: props.get("extra_msg").map(str::to_string),
    })
}
