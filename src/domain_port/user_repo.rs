use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub role_id: RoleId,
    pub activation: Option<IssuedToken>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Fetch the single record whose `column` equals `value`.
    async fn find_by(
        &self,
        column: LookupColumn,
        value: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Fetch the record holding a pending token with the given hash.
    async fn find_by_token_hash(
        &self,
        purpose: TokenPurpose,
        hash: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn exists(&self, column: LookupColumn, value: &str) -> Result<bool, StoreError>;

    /// Insert a row. Fails with `StoreError::Duplicate` on a unique column clash.
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Replace (or clear, with `None`) the pending token of a workflow.
    async fn set_token(
        &self,
        user_id: UserId,
        purpose: TokenPurpose,
        token: Option<IssuedToken>,
    ) -> Result<(), StoreError>;

    /// Mark the account active and drop its activation token.
    async fn activate(&self, user_id: UserId) -> Result<(), StoreError>;

    /// Store a new password hash and drop any pending reset token.
    async fn update_password(&self, user_id: UserId, password_hash: &str)
    -> Result<(), StoreError>;
}
