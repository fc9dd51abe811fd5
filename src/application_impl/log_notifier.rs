use crate::domain_model::TokenPurpose;
use crate::domain_port::{AccountNotice, AccountNotifier};
use crate::logger::*;

/// Writes account notices to the log. Delivery by mail is left to whoever
/// tails it.
pub struct LogAccountNotifier {
    public_url: String,
}

impl LogAccountNotifier {
    pub fn new(public_url: impl Into<String>) -> Self {
        LogAccountNotifier {
            public_url: public_url.into(),
        }
    }

    fn link(&self, notice: &AccountNotice) -> String {
        let path = match notice.purpose {
            TokenPurpose::Activation => "activate",
            TokenPurpose::PasswordReset => "password_reset/confirm",
        };
        format!(
            "{}/{}?token={}",
            self.public_url.trim_end_matches('/'),
            path,
            notice.token
        )
    }
}

#[async_trait::async_trait]
impl AccountNotifier for LogAccountNotifier {
    async fn send(&self, notice: AccountNotice) -> anyhow::Result<()> {
        info!(
            user_id = %notice.user_id,
            email = %notice.email,
            purpose = ?notice.purpose,
            link = %self.link(&notice),
            "account notice"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::UserId;

    #[test]
    fn link_points_at_the_workflow_endpoint() {
        let notifier = LogAccountNotifier::new("https://login.example.com/");
        let notice = AccountNotice {
            purpose: TokenPurpose::PasswordReset,
            user_id: UserId(1),
            user_name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            token: "abc".to_string(),
        };

        assert_eq!(
            notifier.link(&notice),
            "https://login.example.com/password_reset/confirm?token=abc"
        );
    }
}
