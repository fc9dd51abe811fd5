use crate::application_port::IdentityError;
use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is disabled")]
    AccountDisabled,
    #[error("user name already taken")]
    UserNameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserRecord,
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        subject: &str,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn verify_access_token(&self, token: &AccessToken) -> Result<TokenIdentity, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<UserRecord, AuthError>;
    async fn activate(&self, token: &str) -> Result<UserRecord, AuthError>;
    async fn resend_activation(&self, identifier: &str) -> Result<(), AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn request_password_reset(&self, identifier: &str) -> Result<(), AuthError>;
    async fn reset_password(&self, token: &str, password: &str) -> Result<UserRecord, AuthError>;
    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError>;
    async fn current_user(&self, identity: Identity) -> Result<UserRecord, AuthError>;
}
