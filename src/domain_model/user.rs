use super::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(UserId)
    }
}

/// One-time token workflows stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    Activation,
    PasswordReset,
}

/// Keyed hash of a one-time token and the moment it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub hash: String,
    pub generated_at: DateTime<Utc>,
}

/// A granted authority, e.g. `ROLE_USER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(pub String);

/// A row of `users`, joined with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub role: Role,
    pub activation_hash: Option<String>,
    pub activation_hash_gen_ts: Option<DateTime<Utc>>,
    pub pw_reset_hash: Option<String>,
    pub pw_reset_hash_gen_ts: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

impl UserRecord {
    pub fn token_generated_at(&self, purpose: TokenPurpose) -> Option<DateTime<Utc>> {
        match purpose {
            TokenPurpose::Activation => self.activation_hash_gen_ts,
            TokenPurpose::PasswordReset => self.pw_reset_hash_gen_ts,
        }
    }
}

/// What the security boundary needs to know about an authenticated user.
pub trait Authenticatable {
    /// Stable identifier used to re-load the user later.
    fn identifier(&self) -> &str;
    fn credential_hash(&self) -> &str;
    fn is_enabled(&self) -> bool;
    fn authorities(&self) -> Vec<Authority>;
}

impl Authenticatable for UserRecord {
    fn identifier(&self) -> &str {
        &self.email
    }

    fn credential_hash(&self) -> &str {
        &self.password_hash
    }

    fn is_enabled(&self) -> bool {
        self.is_active
    }

    fn authorities(&self) -> Vec<Authority> {
        vec![Authority(self.role.name.clone())]
    }
}
