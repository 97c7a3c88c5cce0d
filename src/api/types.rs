use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Loan,
    commands::{BorrowItem, ReturnItem},
    value_objects::{ItemId, LoanId, UserId},
};

/// 貸出リクエスト（POST /api/loan/borrow）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub user_id: i64,
    pub item_id: i64,
}

impl BorrowRequest {
    pub fn to_command(&self, credential: String, borrowed_on: NaiveDate) -> BorrowItem {
        BorrowItem {
            credential,
            requested_user_id: UserId::new(self.user_id),
            item_id: ItemId::new(self.item_id),
            borrowed_on,
        }
    }
}

/// 返却リクエスト（POST /api/loan/return）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub loan_id: Uuid,
}

impl ReturnRequest {
    pub fn to_command(&self, credential: String, returned_on: NaiveDate) -> ReturnItem {
        ReturnItem {
            credential,
            loan_id: LoanId::from_uuid(self.loan_id),
            returned_on,
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub id: Uuid,
    pub user_id: i64,
    pub item_id: i64,
    pub loan_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub penalty: u32,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.loan_id.value(),
            user_id: loan.user_id.value(),
            item_id: loan.item_id.value(),
            loan_date: loan.loan_date,
            return_date: loan.return_date,
            status: loan.status.as_str().to_string(),
            penalty: loan.penalty.value(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
