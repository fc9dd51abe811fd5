use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::{Auth, Settings};
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub identity_resolver: Arc<dyn IdentityResolver>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let notifier: Arc<dyn AccountNotifier> =
            Arc::new(LogAccountNotifier::new(settings.http.public_url.clone()));

        let server = match settings.store.backend.as_str() {
            "memory" => {
                warn!("memory store selected, accounts are lost on restart");
                Self::in_memory(&settings.auth, notifier)?
            }
            "mysql" => {
                let dsn = settings
                    .store
                    .dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.dsn is required for the mysql backend"))?;
                let pool = connect(dsn, settings.store.max_connections).await?;
                if settings.store.run_migrations {
                    MIGRATOR.run(&pool).await?;
                    info!("migrations applied");
                }

                let user_repo: Arc<dyn UserRepo> = Arc::new(MySqlUserRepo::new(pool.clone()));
                let role_repo: Arc<dyn RoleRepo> = Arc::new(MySqlRoleRepo::new(pool.clone()));
                let mut server = Self::assemble(&settings.auth, user_repo, role_repo, notifier)?;
                server.pool = Some(pool);
                server
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        info!(backend = %settings.store.backend, "server started");
        Ok(server)
    }

    /// Wires every service over a fresh `MemoryUserStore`.
    pub fn in_memory(auth: &Auth, notifier: Arc<dyn AccountNotifier>) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryUserStore::new());
        let user_repo: Arc<dyn UserRepo> = store.clone();
        let role_repo: Arc<dyn RoleRepo> = store;
        Self::assemble(auth, user_repo, role_repo, notifier)
    }

    fn assemble(
        auth: &Auth,
        user_repo: Arc<dyn UserRepo>,
        role_repo: Arc<dyn RoleRepo>,
        notifier: Arc<dyn AccountNotifier>,
    ) -> anyhow::Result<Self> {
        if auth.jwt_signing_key.is_empty() {
            return Err(anyhow::anyhow!("auth.jwt_signing_key must be set"));
        }
        let key = auth.jwt_signing_key.clone().into_bytes();

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            access_ttl: Duration::from_secs(auth.access_ttl_secs),
            signing_key: key.clone(),
        }));

        let identity_resolver: Arc<dyn IdentityResolver> =
            Arc::new(RealIdentityResolver::new(user_repo.clone()));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            identity_resolver.clone(),
            user_repo,
            role_repo,
            credential_hasher,
            token_codec,
            notifier,
            TokenDigest::new(key),
            AuthPolicy {
                token_ttl: Duration::from_secs(auth.token_ttl_secs),
                min_user_name_len: auth.min_user_name_len,
                min_password_len: auth.min_password_len,
            },
        ));

        Ok(Self {
            auth_service,
            identity_resolver,
            pool: None,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("mysql pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings;

    fn auth() -> Auth {
        parse_settings(Some("settings/dev.toml")).unwrap().auth
    }

    #[tokio::test]
    async fn memory_backend_needs_no_database() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.store.backend = "memory".to_string();

        let server = Server::try_new(&settings).await.unwrap();

        assert!(server.pool.is_none());
        server.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.store.backend = "postgres".to_string();

        let err = Server::try_new(&settings).await.err().unwrap();

        assert!(err.to_string().contains("postgres"));
    }

    #[tokio::test]
    async fn mysql_backend_requires_a_dsn() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.store.backend = "mysql".to_string();
        settings.store.dsn = None;

        let err = Server::try_new(&settings).await.err().unwrap();

        assert!(err.to_string().contains("store.dsn"));
    }

    #[test]
    fn empty_signing_key_is_rejected() {
        let mut auth = auth();
        auth.jwt_signing_key.clear();

        let err = Server::in_memory(&auth, Arc::new(MemoryOutbox::default()))
            .err()
            .unwrap();

        assert!(err.to_string().contains("jwt_signing_key"));
    }
}
