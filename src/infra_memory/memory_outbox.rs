use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use anyhow::anyhow;
use std::sync::Mutex;

/// Keeps every account notice in memory instead of delivering it.
#[derive(Default)]
pub struct MemoryOutbox {
    notices: Mutex<Vec<AccountNotice>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<AccountNotice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// Token of the most recent notice sent to `email` for `purpose`.
    pub fn last_token(&self, email: &str, purpose: TokenPurpose) -> Option<String> {
        self.notices()
            .into_iter()
            .rev()
            .find(|n| n.email == email && n.purpose == purpose)
            .map(|n| n.token)
    }
}

#[async_trait::async_trait]
impl AccountNotifier for MemoryOutbox {
    async fn send(&self, notice: AccountNotice) -> anyhow::Result<()> {
        debug!(user_id = %notice.user_id, purpose = ?notice.purpose, "notice queued in memory");
        self.notices
            .lock()
            .map_err(|e| anyhow!("outbox poisoned: {e}"))?
            .push(notice);
        Ok(())
    }
}
