use crate::domain::{
    Loan,
    value_objects::{LoanId, UserId},
};
use async_trait::async_trait;
use thiserror::Error;

/// 貸出ストアのエラー
#[derive(Debug, Error)]
pub enum LoanStoreError {
    /// 貸出が存在しない
    #[error("Loan {0} not found")]
    NotFound(LoanId),

    /// 永続化層の障害
    #[error("Loan store backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, LoanStoreError>;

/// 貸出ストアポート
///
/// Loanエンティティの永続化を抽象化する。
/// 同一IDへの同時更新は後勝ち（楽観ロックなし）。
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// 新しい貸出を保存する
    async fn create(&self, loan: Loan) -> Result<Loan>;

    /// IDで貸出を取得する
    async fn get(&self, loan_id: LoanId) -> Result<Loan>;

    /// 貸出を上書き保存する
    ///
    /// IDが存在しない場合は`NotFound`。
    async fn update(&self, loan: &Loan) -> Result<()>;

    /// 利用者の全貸出を取得する（貸出日の新しい順）
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Loan>>;
}
