use super::UserRecord;
use chrono::{DateTime, Utc};

/// Caller identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Token,
}

/// Every shape an authenticated caller can take at the HTTP boundary.
#[derive(Debug, Clone)]
pub enum Identity {
    User(UserRecord),
    Token(TokenIdentity),
}

impl Identity {
    pub fn kind(&self) -> RecordKind {
        match self {
            Identity::User(_) => RecordKind::User,
            Identity::Token(_) => RecordKind::Token,
        }
    }

    /// Fully qualified type name of the wrapped representation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Identity::User(_) => std::any::type_name::<UserRecord>(),
            Identity::Token(_) => std::any::type_name::<TokenIdentity>(),
        }
    }
}

impl From<UserRecord> for Identity {
    fn from(record: UserRecord) -> Self {
        Identity::User(record)
    }
}

impl From<TokenIdentity> for Identity {
    fn from(token: TokenIdentity) -> Self {
        Identity::Token(token)
    }
}
