//! ServerQuery command builder.

use std::fmt;

use super::codec::escape;

/// A ServerQuery command: a name, `key=value` arguments and `-flag` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<(String, String)>,
    options: Vec<String>,
}

impl Command {
    /// Create a command with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Add a `key=value` argument; the value is escaped on encoding.
    pub fn arg(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.args.push((key.into(), value.to_string()));
        self
    }

    /// Add pass-through options such as `-uid` or `-all`.
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an argument value.
    pub fn get_arg(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Options in the order they were added.
    pub fn get_options(&self) -> &[String] {
        &self.options
    }

    /// Encode as a single request line, without the terminator.
    pub fn encode(&self) -> String {
        let mut line = self.name.clone();
        for (key, value) in &self.args {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            line.push_str(&escape(value));
        }
        for option in &self.options {
            line.push(' ');
            line.push_str(option);
        }
        line
    }

    /// Line to log in place of [`encode`](Self::encode), with secrets masked.
    pub fn redacted(&self) -> String {
        if self.name != "login" {
            return self.encode();
        }
        let mut masked = self.clone();
        for (key, value) in &mut masked.args {
            if key == "client_login_password" {
                *value = "***".to_string();
            }
        }
        masked.encode()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
