use super::TokenDigest;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Widest `userName` / `email` value the schema accepts.
const MAX_FIELD_LEN: usize = 180;

/// Password hashed once to give failed lookups the same verification cost.
const DUMMY_PASSWORD: &str = "usergate-dummy-password";

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// How long activation and password-reset tokens stay valid.
    pub token_ttl: Duration,
    pub min_user_name_len: usize,
    pub min_password_len: usize,
}

pub struct RealAuthService {
    resolver: Arc<dyn IdentityResolver>,
    user_repo: Arc<dyn UserRepo>,
    role_repo: Arc<dyn RoleRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    notifier: Arc<dyn AccountNotifier>,
    token_digest: TokenDigest,
    policy: AuthPolicy,
    dummy_hash: OnceCell<String>,
}

impl RealAuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        user_repo: Arc<dyn UserRepo>,
        role_repo: Arc<dyn RoleRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        notifier: Arc<dyn AccountNotifier>,
        token_digest: TokenDigest,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            resolver,
            user_repo,
            role_repo,
            credential_hasher,
            token_codec,
            notifier,
            token_digest,
            policy,
            dummy_hash: OnceCell::new(),
        }
    }

    fn validate_registration(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if !is_email_shaped(email) || email.chars().count() > MAX_FIELD_LEN {
            return Err(AuthError::InvalidInput("email is not a valid address".into()));
        }
        let name_len = user_name.chars().count();
        if name_len < self.policy.min_user_name_len || name_len > MAX_FIELD_LEN {
            return Err(AuthError::InvalidInput(format!(
                "user name must be {} to {} characters",
                self.policy.min_user_name_len, MAX_FIELD_LEN
            )));
        }
        // Such a name could never be used to log in: it would be looked up by e-mail.
        if is_email_shaped(user_name) {
            return Err(AuthError::InvalidInput(
                "user name must not look like an email address".into(),
            ));
        }
        self.validate_password(password)
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.policy.min_password_len {
            return Err(AuthError::InvalidInput(format!(
                "password must be at least {} characters",
                self.policy.min_password_len
            )));
        }
        Ok(())
    }

    /// A fresh raw token and the digest to persist for it.
    fn issue_token(&self) -> Result<(String, IssuedToken), AuthError> {
        let token = self.token_digest.generate();
        let hash = self
            .token_digest
            .hmac_hex(&token)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((
            token,
            IssuedToken {
                hash,
                generated_at: Utc::now(),
            },
        ))
    }

    /// The user a raw one-time token was issued to, if it is still valid.
    async fn find_pending(
        &self,
        purpose: TokenPurpose,
        token: &str,
    ) -> Result<UserRecord, AuthError> {
        let hash = self
            .token_digest
            .hmac_hex(token)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        let record = self
            .user_repo
            .find_by_token_hash(purpose, &hash)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let generated_at = record
            .token_generated_at(purpose)
            .ok_or(AuthError::TokenInvalid)?;
        if generated_at + self.policy.token_ttl < Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        Ok(record)
    }

    async fn notify(&self, user: &UserRecord, purpose: TokenPurpose, token: String) {
        let notice = AccountNotice {
            purpose,
            user_id: user.id,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            token,
        };
        if let Err(e) = self.notifier.send(notice).await {
            error!(user_id = %user.id, ?purpose, error = %e, "account notice not sent");
        }
    }

    /// Burn one password verification for a login that matched no account.
    async fn verify_against_dummy(&self, password: &str) -> Result<(), AuthError> {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.credential_hasher.hash_password(DUMMY_PASSWORD))
            .await?;
        self.credential_hasher
            .verify_password(password, dummy)
            .await?;
        Ok(())
    }

    async fn duplicate_error(&self, email: &str) -> AuthError {
        match self.user_repo.exists(LookupColumn::Email, email).await {
            Ok(true) => AuthError::EmailTaken,
            Ok(false) => AuthError::UserNameTaken,
            Err(e) => e.into(),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn register(&self, request: RegisterInput) -> Result<UserRecord, AuthError> {
        let user_name = request.user_name.trim();
        let email = request.email.trim();

        self.validate_registration(user_name, email, &request.password)?;

        if self.user_repo.exists(LookupColumn::UserName, user_name).await? {
            return Err(AuthError::UserNameTaken);
        }
        if self.user_repo.exists(LookupColumn::Email, email).await? {
            return Err(AuthError::EmailTaken);
        }

        let role = self
            .role_repo
            .find_by_name(DEFAULT_ROLE)
            .await?
            .ok_or_else(|| AuthError::InternalError(format!("role {DEFAULT_ROLE} is missing")))?;

        let password_hash = self
            .credential_hasher
            .hash_password(&request.password)
            .await?;
        let (token, activation) = self.issue_token()?;

        let created = self
            .user_repo
            .create(NewUser {
                user_name: user_name.to_string(),
                email: email.to_string(),
                password_hash,
                is_active: false,
                role_id: role.id,
                activation: Some(activation),
            })
            .await;
        let user_id = match created {
            Ok(id) => id,
            Err(StoreError::Duplicate(_)) => return Err(self.duplicate_error(email).await),
            Err(e) => return Err(e.into()),
        };

        let user = self.resolver.resolve_identity(email).await?;
        self.notify(&user, TokenPurpose::Activation, token).await;

        info!(%user_id, "user registered");
        Ok(user)
    }

    async fn activate(&self, token: &str) -> Result<UserRecord, AuthError> {
        let record = self.find_pending(TokenPurpose::Activation, token).await?;

        self.user_repo.activate(record.id).await?;
        info!(user_id = %record.id, "account activated");

        Ok(self.resolver.refresh_identity(record.into()).await?)
    }

    async fn resend_activation(&self, identifier: &str) -> Result<(), AuthError> {
        let user = match self.resolver.resolve_identity(identifier.trim()).await {
            Ok(user) => user,
            Err(e) => {
                info!(error = %e, "activation resend for unknown identity ignored");
                return Ok(());
            }
        };
        if user.is_enabled() {
            info!(user_id = %user.id, "activation resend for active account ignored");
            return Ok(());
        }

        let (token, issued) = self.issue_token()?;
        self.user_repo
            .set_token(user.id, TokenPurpose::Activation, Some(issued))
            .await?;
        self.notify(&user, TokenPurpose::Activation, token).await;

        info!(user_id = %user.id, "activation token reissued");
        Ok(())
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput {
            identifier,
            password,
        } = request;

        let user = match self.resolver.resolve_identity(identifier.trim()).await {
            Ok(user) => user,
            Err(e) => {
                info!(error = %e, "login rejected");
                self.verify_against_dummy(&password).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = self
            .credential_hasher
            .verify_password(&password, user.credential_hash())
            .await?;
        if !ok {
            info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_enabled() {
            info!(user_id = %user.id, "login rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        let (access_token, expires_at) = self
            .token_codec
            .issue_access_token(user.identifier())
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginResult {
            user,
            access_token,
            expires_at,
        })
    }

    async fn request_password_reset(&self, identifier: &str) -> Result<(), AuthError> {
        let user = match self.resolver.resolve_identity(identifier.trim()).await {
            Ok(user) => user,
            Err(e) => {
                // Callers get no hint whether the account exists.
                info!(error = %e, "password reset for unknown identity ignored");
                return Ok(());
            }
        };

        let (token, issued) = self.issue_token()?;
        self.user_repo
            .set_token(user.id, TokenPurpose::PasswordReset, Some(issued))
            .await?;
        self.notify(&user, TokenPurpose::PasswordReset, token).await;

        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    async fn reset_password(&self, token: &str, password: &str) -> Result<UserRecord, AuthError> {
        self.validate_password(password)?;
        let record = self.find_pending(TokenPurpose::PasswordReset, token).await?;

        let password_hash = self.credential_hasher.hash_password(password).await?;
        self.user_repo
            .update_password(record.id, &password_hash)
            .await?;
        info!(user_id = %record.id, "password reset");

        Ok(self.resolver.refresh_identity(record.into()).await?)
    }

    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = self
            .token_codec
            .verify_access_token(&AccessToken(token.to_string()))
            .await?;
        Ok(Identity::Token(identity))
    }

    async fn current_user(&self, identity: Identity) -> Result<UserRecord, AuthError> {
        let user = if self.resolver.supports_record_kind(identity.kind()) {
            self.resolver.refresh_identity(identity).await?
        } else {
            match identity {
                Identity::Token(token) => self.resolver.resolve_identity(&token.subject).await?,
                other => return Err(IdentityError::Unsupported(other.type_name()).into()),
            }
        };

        if !user.is_enabled() {
            return Err(AuthError::AccountDisabled);
        }
        Ok(user)
    }
}
