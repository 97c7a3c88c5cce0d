use crate::application::loan::LoanApplicationError;
use crate::ports::{AuthError, InventoryError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LoanApplicationError);

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match &self.0 {
            // 401 Unauthorized - 資格情報の欠落・不正
            LoanApplicationError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
            }

            // 403 Forbidden - 他人の貸出・履歴へのアクセス
            LoanApplicationError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }

            // 404 Not Found
            LoanApplicationError::LoanNotFound(_) => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "Loan not found".to_string(),
            ),
            LoanApplicationError::ItemUnavailable {
                source: InventoryError::NotFound(_),
                ..
            } => (
                StatusCode::NOT_FOUND,
                "ITEM_NOT_FOUND",
                "Book not found".to_string(),
            ),

            // 409 Conflict
            LoanApplicationError::AlreadyReturned(_) => (
                StatusCode::CONFLICT,
                "ALREADY_RETURNED",
                "Loan is already returned".to_string(),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            LoanApplicationError::InsufficientStock(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_STOCK",
                "Book is not available for loan".to_string(),
            ),

            // 502 Bad Gateway - 貸出は記録済みだが在庫の減算に失敗
            LoanApplicationError::StockUpdateFailed { loan, source } => {
                tracing::error!(loan_id = %loan.loan_id, error = %source, "Stock update failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "STOCK_UPDATE_FAILED",
                    format!("Loan {} recorded but stock update failed", loan.loan_id),
                )
            }

            // 503 Service Unavailable - 協調サービスの障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LoanApplicationError::ItemUnavailable { source, .. } => {
                tracing::error!(error = %source, "Inventory error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "INVENTORY_UNAVAILABLE",
                    "Inventory service unavailable".to_string(),
                )
            }
            LoanApplicationError::LoanStoreUnavailable(e) => {
                tracing::error!(error = %e, "Loan store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "LOAN_STORE_UNAVAILABLE",
                    "Failed to access loan records".to_string(),
                )
            }

            // 504 Gateway Timeout
            LoanApplicationError::Timeout { collaborator } => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                format!("{} did not respond in time", collaborator),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
