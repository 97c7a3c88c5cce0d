use crate::domain::value_objects::UserId;
use crate::ports::token_verifier::{AuthError, Result, TokenVerifier as TokenVerifierTrait};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::revocation::TokenRevocationList;

/// 認証サービスが発行するトークンのクレーム
///
/// subjectは利用者ID（数値文字列）。emailは任意。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Authorizationヘッダ値から"Bearer "接頭辞を取り除く
fn strip_bearer(credential: &str) -> Result<&str> {
    credential
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AuthError::Unauthenticated("Invalid or missing Authorization token".to_string())
        })
}

/// subjectを正の利用者IDとして解釈する
fn parse_subject(subject: &str) -> Result<UserId> {
    match subject.parse::<i64>() {
        Ok(id) if id > 0 => Ok(UserId::new(id)),
        _ => Err(AuthError::Unauthenticated(format!(
            "Subject is not a valid userId: {}",
            subject
        ))),
    }
}

/// TokenVerifierのJWT実装
///
/// 認証サービスと共有するHMAC鍵で署名を検証する。
/// 失効済みトークンはプロセス内の失効リストで拒否する。
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    revoked: Arc<TokenRevocationList>,
}

impl TokenVerifier {
    /// 共有シークレットから新しいTokenVerifierを作成
    pub fn new(secret: &str) -> Self {
        Self::with_revocation_list(secret, Arc::new(TokenRevocationList::new()))
    }

    pub fn with_revocation_list(secret: &str, revoked: Arc<TokenRevocationList>) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            revoked,
        }
    }

    fn decode_claims(&self, token: &str) -> Result<LoanClaims> {
        decode::<LoanClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AuthError::Unauthenticated("Token expired".to_string())
                }
                _ => {
                    tracing::debug!(error = %e, "JWT verification failed");
                    AuthError::Unauthenticated("Invalid token".to_string())
                }
            })
    }
}

#[async_trait]
impl TokenVerifierTrait for TokenVerifier {
    async fn verify(&self, credential: &str) -> Result<UserId> {
        let token = strip_bearer(credential)?;

        if self.revoked.is_revoked(token) {
            return Err(AuthError::Unauthenticated(
                "Token has been revoked".to_string(),
            ));
        }

        let claims = self.decode_claims(token)?;
        parse_subject(&claims.sub)
    }

    async fn email_claim(&self, credential: &str) -> Result<Option<String>> {
        let token = strip_bearer(credential)?;
        let claims = self.decode_claims(token)?;

        Ok(claims.email.filter(|email| !email.trim().is_empty()))
    }

    async fn revoke(&self, credential: &str) -> Result<()> {
        let token = strip_bearer(credential)?;
        let claims = self.decode_claims(token)?;

        self.revoked
            .revoke(token, claims.exp, chrono::Utc::now().timestamp());
        tracing::info!(subject = %claims.sub, "Token revoked");

        Ok(())
    }
}
