use crate::domain::{
    Loan,
    value_objects::{ItemId, LoanId},
};
use crate::ports::{AuthError, InventoryError, LoanStoreError};
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 資格情報が欠落・不正・期限切れ
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// 認証済みだが対象の貸出・利用者へのアクセス権がない
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 貸出が見つからない
    #[error("Loan {0} not found")]
    LoanNotFound(LoanId),

    /// 資料が取得できない（存在しない、または在庫サービス障害）
    #[error("Item {item_id} is unavailable")]
    ItemUnavailable {
        item_id: ItemId,
        #[source]
        source: InventoryError,
    },

    /// 在庫なし
    #[error("Item {0} has insufficient stock")]
    InsufficientStock(ItemId),

    /// 貸出は記録されたが在庫の減算に失敗した
    ///
    /// 貸出レコードは取り消されない。作成済みの貸出を保持する。
    #[error("Loan {} recorded but stock update failed", .loan.loan_id)]
    StockUpdateFailed {
        loan: Box<Loan>,
        #[source]
        source: InventoryError,
    },

    /// 既に返却済み
    #[error("Loan {0} is already returned")]
    AlreadyReturned(LoanId),

    /// LoanStoreの障害
    #[error("Loan store unavailable")]
    LoanStoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 協調サービスの応答がタイムアウトした
    #[error("{collaborator} timed out")]
    Timeout { collaborator: &'static str },
}

impl From<AuthError> for LoanApplicationError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(msg) => LoanApplicationError::Unauthenticated(msg),
        }
    }
}

impl From<LoanStoreError> for LoanApplicationError {
    fn from(err: LoanStoreError) -> Self {
        match err {
            LoanStoreError::NotFound(loan_id) => LoanApplicationError::LoanNotFound(loan_id),
            LoanStoreError::Backend(source) => LoanApplicationError::LoanStoreUnavailable(source),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
