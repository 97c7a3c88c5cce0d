use crate::domain::value_objects::UserId;
use async_trait::async_trait;
use thiserror::Error;

/// 認証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 資格情報が欠落・不正・署名不一致・期限切れ・失効済み
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// トークン検証ポート
///
/// 貸出コンテキストと認証コンテキストの境界を維持する。
/// 貸出コンテキストは検証済みの利用者IDのみを知り、資格情報の詳細は知らない。
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Bearer資格情報を検証して利用者IDを返す
    ///
    /// subjectが正の整数として解釈できないトークンは拒否する。
    async fn verify(&self, credential: &str) -> Result<UserId>;

    /// 同じ資格情報からメールアドレスのクレームを取り出す
    ///
    /// クレームが無い場合はエラーではなく`None`を返す。
    /// 呼び出し側はディレクトリ参照にフォールバックする。
    async fn email_claim(&self, credential: &str) -> Result<Option<String>>;

    /// 資格情報を失効させる（ログアウト）
    ///
    /// 失効済みの資格情報は以後`verify`で`Unauthenticated`になる。
    async fn revoke(&self, credential: &str) -> Result<()>;
}
