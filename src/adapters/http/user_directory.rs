use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, ServiceCredential, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    email: Option<String>,
}

/// UserDirectoryのHTTP実装（利用者サービス）
///
/// サービスアカウントでログインし、内部APIで利用者のメールアドレスを引く。
pub struct UserDirectory {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl UserDirectory {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn service_login(&self) -> Result<ServiceCredential> {
        let response: LoginResponse = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&LoginRequest {
                username: &self.username,
                password: &self.password,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = response
            .token
            .ok_or("Failed to get service account token")?;

        tracing::debug!("Service account token obtained");
        Ok(ServiceCredential(format!("Bearer {}", token)))
    }

    async fn lookup_email(
        &self,
        credential: &ServiceCredential,
        user_id: UserId,
    ) -> Result<String> {
        let user: UserRecord = self
            .http
            .get(format!("{}/api/auth/internal/user/{}", self.base_url, user_id))
            .header(reqwest::header::AUTHORIZATION, &credential.0)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        user.email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| format!("User email not found for userId: {}", user_id).into())
    }
}
