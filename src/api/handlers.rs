use crate::application::loan::{
    LoanApplicationError, ServiceDependencies, borrow_item as execute_borrow_item,
    loan_history as execute_loan_history, return_item as execute_return_item,
};
use crate::domain::{commands::LoanHistory, value_objects::UserId};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{BorrowRequest, LoanResponse, ReturnRequest},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// Authorizationヘッダの値を取り出す
///
/// 形式の検証（"Bearer "接頭辞）はTokenVerifierが行う。
fn credential(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError::from(LoanApplicationError::Unauthenticated(
                "Invalid or missing Authorization token".to_string(),
            ))
        })
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /api/loan/borrow - 資料を借りる
///
/// 強制されるビジネスルール:
/// - 有効な資格情報であること（userIdはトークン側が優先される）
/// - 在庫が1以上であること
pub async fn borrow(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<BorrowRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = req.to_command(credential(&headers)?, today());
    let loan = execute_borrow_item(&state.service_deps, cmd).await?;
    Ok(Json(LoanResponse::from(loan)))
}

/// POST /api/loan/return - 資料を返却する
///
/// 強制されるビジネスルール:
/// - 貸出が存在し、呼び出し元本人の貸出であること
/// - 既に返却済みでないこと
/// - 貸出日から7日を超える返却は延滞金1000
pub async fn return_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let cmd = req.to_command(credential(&headers)?, today());
    let loan = execute_return_item(&state.service_deps, cmd).await?;
    Ok(Json(LoanResponse::from(loan)))
}

/// POST /api/auth/logout - 呼び出し元のトークンを失効させる
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let credential = credential(&headers)?;
    state
        .service_deps
        .token_verifier
        .revoke(&credential)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /api/loan/history/:user_id - 貸出履歴を取得
///
/// 新しい貸出から順に返す。他人の履歴は403。
pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let query = LoanHistory {
        credential: credential(&headers)?,
        requested_user_id: UserId::new(user_id),
    };

    let loans = execute_loan_history(&state.service_deps, query).await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}
