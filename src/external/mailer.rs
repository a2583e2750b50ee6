use crate::error::AppResult;
use async_trait::async_trait;

/// One outbound message. `from` is already resolved by the caller
/// (request override, template sender, or the configured default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
    pub from: String,
}

/// Mail-send capability. Constructed once at startup and injected into the
/// services that send, so tests can swap in a recording mock.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, email: &OutboundEmail) -> AppResult<()>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Records every send; fails (once per call) for configured addresses.
    #[derive(Default)]
    pub struct MockMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
        fail_addresses: Vec<String>,
    }

    impl MockMailer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_for(addresses: &[&str]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_addresses: addresses.iter().map(|a| a.to_string()).collect(),
            }
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        pub fn sent_emails(&self) -> Vec<OutboundEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, email: &OutboundEmail) -> AppResult<()> {
            if self.fail_addresses.iter().any(|a| a == &email.to) {
                return Err(AppError::MailError("mailbox unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }
}
