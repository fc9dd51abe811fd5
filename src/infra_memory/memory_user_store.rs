use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

struct Tables {
    roles: Vec<Role>,
    users: Vec<UserRecord>,
    next_user_id: u64,
}

/// `users` and `users_roles` kept in a process-local table set.
///
/// Lookups compare values exactly; there is no collation.
pub struct MemoryUserStore {
    tables: Mutex<Tables>,
}

impl MemoryUserStore {
    /// An empty store seeded with the default role, as the migrations do.
    pub fn new() -> Self {
        MemoryUserStore {
            tables: Mutex::new(Tables {
                roles: vec![Role {
                    id: RoleId(1),
                    name: DEFAULT_ROLE.to_string(),
                }],
                users: Vec::new(),
                next_user_id: 1,
            }),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Connection(format!("memory store poisoned: {e}")))
    }

    fn with_user<F>(&self, user_id: UserId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound)?;
        f(user);
        Ok(())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn column_value(user: &UserRecord, column: LookupColumn) -> &str {
    match column {
        LookupColumn::Email => &user.email,
        LookupColumn::UserName => &user.user_name,
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserStore {
    async fn find_by(
        &self,
        column: LookupColumn,
        value: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| column_value(u, column) == value)
            .cloned())
    }

    async fn find_by_token_hash(
        &self,
        purpose: TokenPurpose,
        hash: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|u| {
                let stored = match purpose {
                    TokenPurpose::Activation => u.activation_hash.as_deref(),
                    TokenPurpose::PasswordReset => u.pw_reset_hash.as_deref(),
                };
                stored == Some(hash)
            })
            .cloned())
    }

    async fn exists(&self, column: LookupColumn, value: &str) -> Result<bool, StoreError> {
        let tables = self.tables()?;
        Ok(tables.users.iter().any(|u| column_value(u, column) == value))
    }

    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut tables = self.tables()?;

        if tables.users.iter().any(|u| u.user_name == user.user_name) {
            return Err(StoreError::Duplicate(format!(
                "userName '{}'",
                user.user_name
            )));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email '{}'", user.email)));
        }
        let role = tables
            .roles
            .iter()
            .find(|r| r.id == user.role_id)
            .cloned()
            .ok_or_else(|| StoreError::Malformed(format!("unknown role id {}", user.role_id)))?;

        let id = UserId(tables.next_user_id);
        tables.next_user_id += 1;

        let (activation_hash, activation_hash_gen_ts) = match user.activation {
            Some(token) => (Some(token.hash), Some(token.generated_at)),
            None => (None, None),
        };
        tables.users.push(UserRecord {
            id,
            user_name: user.user_name,
            email: user.email,
            password_hash: user.password_hash,
            is_active: user.is_active,
            role,
            activation_hash,
            activation_hash_gen_ts,
            pw_reset_hash: None,
            pw_reset_hash_gen_ts: None,
            created: Utc::now(),
        });

        Ok(id)
    }

    async fn set_token(
        &self,
        user_id: UserId,
        purpose: TokenPurpose,
        token: Option<IssuedToken>,
    ) -> Result<(), StoreError> {
        let (hash, generated_at) = match token {
            Some(t) => (Some(t.hash), Some(t.generated_at)),
            None => (None, None),
        };
        self.with_user(user_id, |u| match purpose {
            TokenPurpose::Activation => {
                u.activation_hash = hash;
                u.activation_hash_gen_ts = generated_at;
            }
            TokenPurpose::PasswordReset => {
                u.pw_reset_hash = hash;
                u.pw_reset_hash_gen_ts = generated_at;
            }
        })
    }

    async fn activate(&self, user_id: UserId) -> Result<(), StoreError> {
        self.with_user(user_id, |u| {
            u.is_active = true;
            u.activation_hash = None;
            u.activation_hash_gen_ts = None;
        })
    }

    async fn update_password(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        self.with_user(user_id, |u| {
            u.password_hash = password_hash.to_string();
            u.pw_reset_hash = None;
            u.pw_reset_hash_gen_ts = None;
        })
    }
}

#[async_trait::async_trait]
impl RoleRepo for MemoryUserStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(user_name: &str, email: &str) -> NewUser {
        NewUser {
            user_name: user_name.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_active: false,
            role_id: RoleId(1),
            activation: Some(IssuedToken {
                hash: format!("act-{user_name}"),
                generated_at: Utc::now(),
            }),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_either_column() {
        let store = MemoryUserStore::new();
        let id = store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let by_email = store
            .find_by(LookupColumn::Email, "alice@example.com")
            .await
            .unwrap()
            .expect("found by email");
        let by_name = store
            .find_by(LookupColumn::UserName, "alice")
            .await
            .unwrap()
            .expect("found by user name");

        assert_eq!(by_email.id, id);
        assert_eq!(by_name, by_email);
        assert_eq!(by_email.role.name, DEFAULT_ROLE);
        assert!(store.find_by(LookupColumn::UserName, "alice@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_columns_are_rejected() {
        let store = MemoryUserStore::new();
        store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let err = store.create(new_user("alice", "other@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        let err = store.create(new_user("bob", "alice@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn activation_clears_pending_token() {
        let store = MemoryUserStore::new();
        let id = store.create(new_user("alice", "alice@example.com")).await.unwrap();

        let pending = store
            .find_by_token_hash(TokenPurpose::Activation, "act-alice")
            .await
            .unwrap()
            .expect("pending activation");
        assert!(!pending.is_active);

        store.activate(id).await.unwrap();

        assert!(store
            .find_by_token_hash(TokenPurpose::Activation, "act-alice")
            .await
            .unwrap()
            .is_none());
        let user = store.find_by(LookupColumn::UserName, "alice").await.unwrap().unwrap();
        assert!(user.is_active);
        assert_eq!(user.activation_hash_gen_ts, None);
    }

    #[tokio::test]
    async fn update_password_drops_reset_token() {
        let store = MemoryUserStore::new();
        let id = store.create(new_user("alice", "alice@example.com")).await.unwrap();
        store
            .set_token(
                id,
                TokenPurpose::PasswordReset,
                Some(IssuedToken {
                    hash: "reset".to_string(),
                    generated_at: Utc::now(),
                }),
            )
            .await
            .unwrap();

        store.update_password(id, "new-hash").await.unwrap();

        let user = store.find_by(LookupColumn::UserName, "alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
        assert_eq!(user.pw_reset_hash, None);
    }

    #[tokio::test]
    async fn updates_on_missing_user_report_not_found() {
        let store = MemoryUserStore::new();
        let err = store.activate(UserId(42)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn default_role_is_seeded() {
        let store = MemoryUserStore::new();
        let role = store.find_by_name(DEFAULT_ROLE).await.unwrap();
        assert_eq!(role.map(|r| r.id), Some(RoleId(1)));
        assert!(store.find_by_name("ROLE_ADMIN").await.unwrap().is_none());
    }
}
