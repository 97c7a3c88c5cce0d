use chrono::NaiveDate;

use super::{ItemId, LoanId, UserId};

/// コマンド：資料を借りる
///
/// `requested_user_id`は呼び出し側の申告値。検証済みトークンの
/// 利用者IDと食い違う場合はトークン側が優先される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowItem {
    pub credential: String,
    pub requested_user_id: UserId,
    pub item_id: ItemId,
    pub borrowed_on: NaiveDate,
}

/// コマンド：資料を返却する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnItem {
    pub credential: String,
    pub loan_id: LoanId,
    pub returned_on: NaiveDate,
}

/// クエリ：貸出履歴を取得する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanHistory {
    pub credential: String,
    pub requested_user_id: UserId,
}
