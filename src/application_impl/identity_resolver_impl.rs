use crate::application_port::{IdentityError, IdentityResolver};
use crate::domain_model::*;
use crate::domain_port::UserRepo;
use crate::logger::*;
use std::sync::Arc;

pub struct RealIdentityResolver {
    user_repo: Arc<dyn UserRepo>,
}

impl RealIdentityResolver {
    pub fn new(user_repo: Arc<dyn UserRepo>) -> RealIdentityResolver {
        RealIdentityResolver { user_repo }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for RealIdentityResolver {
    async fn resolve_identity(&self, identifier: &str) -> Result<UserRecord, IdentityError> {
        let column = LookupColumn::classify(identifier);
        let not_found = || IdentityError::NotFound {
            column,
            identifier: identifier.to_string(),
        };

        // Store failures are reported as a plain miss.
        match self.user_repo.find_by(column, identifier).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                debug!(%column, "identity not found");
                Err(not_found())
            }
            Err(e) => {
                warn!(%column, error = %e, "user lookup failed");
                Err(not_found())
            }
        }
    }

    async fn refresh_identity(&self, identity: Identity) -> Result<UserRecord, IdentityError> {
        match identity {
            Identity::User(record) => self.resolve_identity(&record.email).await,
            other => Err(IdentityError::Unsupported(other.type_name())),
        }
    }

    fn supports_record_kind(&self, kind: RecordKind) -> bool {
        kind == RecordKind::User
    }
}
