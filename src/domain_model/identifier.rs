use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Unique column of the `users` table a login identifier is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupColumn {
    Email,
    UserName,
}

impl LookupColumn {
    /// Classify a raw login identifier.
    ///
    /// Anything shaped like `local@domain.tld` is looked up by e-mail, the
    /// rest by user name. This is a syntactic check only: a user name that
    /// happens to look like an address is still treated as an e-mail.
    pub fn classify(identifier: &str) -> Self {
        if is_email_shaped(identifier) {
            LookupColumn::Email
        } else {
            LookupColumn::UserName
        }
    }

    /// Column name as it appears in the schema and in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupColumn::Email => "email",
            LookupColumn::UserName => "userName",
        }
    }
}

impl fmt::Display for LookupColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_email_shaped(value: &str) -> bool {
    lazy_static! {
        static ref EMAIL_SHAPE: Regex = Regex::new(r"(?i)^[^@]+@[^@]+\.[^@.]+$").unwrap();
    }
    EMAIL_SHAPE.is_match(value)
}
