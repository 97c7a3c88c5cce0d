use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, ServiceCredential, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const MOCK_SERVICE_TOKEN: &str = "Bearer mock-service-token";

/// UserDirectoryのモック実装
///
/// Supports stateful testing by storing user emails.
#[derive(Debug, Default)]
pub struct UserDirectory {
    emails: Mutex<HashMap<UserId, String>>,
    logins: AtomicUsize,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an email for testing purposes
    pub fn add_user(&self, user_id: UserId, email: impl Into<String>) {
        self.emails.lock().unwrap().insert(user_id, email.into());
    }

    /// Number of service logins performed
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn service_login(&self) -> Result<ServiceCredential> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceCredential(MOCK_SERVICE_TOKEN.to_string()))
    }

    async fn lookup_email(
        &self,
        credential: &ServiceCredential,
        user_id: UserId,
    ) -> Result<String> {
        if credential.0 != MOCK_SERVICE_TOKEN {
            return Err("forbidden".into());
        }
        self.emails
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| format!("User email not found for userId: {}", user_id).into())
    }
}
