use crate::domain_model::*;

/// A one-time token that has to reach the account owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNotice {
    pub purpose: TokenPurpose,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub token: String,
}

#[async_trait::async_trait]
pub trait AccountNotifier: Send + Sync {
    async fn send(&self, notice: AccountNotice) -> anyhow::Result<()>;
}
