use crate::domain_model::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("{column} '{identifier}' does not exist.")]
    NotFound {
        column: LookupColumn,
        identifier: String,
    },
    #[error("Instances of \"{0}\" are not supported.")]
    Unsupported(&'static str),
}

/// Turns a login identifier into the stored user it names.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Look the identifier up by e-mail or user name, depending on its shape.
    async fn resolve_identity(&self, identifier: &str) -> Result<UserRecord, IdentityError>;

    /// Re-load a previously resolved user to pick up changes made since.
    async fn refresh_identity(&self, identity: Identity) -> Result<UserRecord, IdentityError>;

    fn supports_record_kind(&self, kind: RecordKind) -> bool;
}
