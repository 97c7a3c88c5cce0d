use crate::domain::value_objects::UserId;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// サービスアカウントの資格情報
///
/// ログイン交換で得られるBearerトークン。
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredential(pub String);

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceCredential(***)")
    }
}

/// 利用者ディレクトリポート
///
/// トークンにメールアドレスのクレームが無い場合の宛先解決に使用される。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// サービスアカウントでログインして資格情報を得る
    async fn service_login(&self) -> Result<ServiceCredential>;

    /// 利用者IDからメールアドレスを引く
    async fn lookup_email(&self, credential: &ServiceCredential, user_id: UserId)
    -> Result<String>;
}
