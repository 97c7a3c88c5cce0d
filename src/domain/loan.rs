use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{ItemId, LoanId, Penalty, ReturnLoanError, UserId};

/// 延滞の猶予期間（日数）
///
/// 返却日から7日を引いた日付が貸出日より後の場合に延滞とみなす。
/// ちょうど7日目の返却は期限内。
pub const GRACE_PERIOD_DAYS: i64 = 7;

/// 延滞時の定額延滞金
pub const LATE_RETURN_PENALTY: u32 = 1000;

/// 貸出ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// 貸出中
    Borrowed,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "BORROWED",
            LoanStatus::Returned => "RETURNED",
        }
    }

    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BORROWED" => Ok(LoanStatus::Borrowed),
            "RETURNED" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan集約 - 1件の資料の1回の貸出
///
/// 不変条件：
/// - statusがBorrowedであることとreturn_dateが未設定であることは同値
/// - penaltyが非ゼロになるのは返却済みかつ猶予期間超過の場合のみ
/// - user_idは作成後に変更されない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 識別子
    pub loan_id: LoanId,

    // 他のコンテキストへの参照（IDのみ）
    pub user_id: UserId,
    pub item_id: ItemId,

    // 貸出管理の責務
    pub loan_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub penalty: Penalty,
}

impl Loan {
    /// 状態の不変条件を満たしているか
    pub fn is_consistent(&self) -> bool {
        let status_matches = self.status.is_returned() == self.return_date.is_some();
        let penalty_allowed = !self.penalty.is_charged() || self.status.is_returned();
        status_matches && penalty_allowed
    }
}

/// 純粋関数：資料を貸し出す
///
/// ビジネスルール：
/// - 状態はBorrowed
/// - 延滞金は0
///
/// 副作用なし。IDを採番した新しいLoanを返す。
pub fn borrow_item(user_id: UserId, item_id: ItemId, loan_date: NaiveDate) -> Loan {
    Loan {
        loan_id: LoanId::new(),
        user_id,
        item_id,
        loan_date,
        return_date: None,
        status: LoanStatus::Borrowed,
        penalty: Penalty::NONE,
    }
}

/// 純粋関数：延滞判定
///
/// `returned_on - 7日` が貸出日より厳密に後の場合に延滞。
pub fn is_late(loan_date: NaiveDate, returned_on: NaiveDate) -> bool {
    returned_on - Duration::days(GRACE_PERIOD_DAYS) > loan_date
}

/// 純粋関数：延滞金の計算
pub fn penalty_for(loan_date: NaiveDate, returned_on: NaiveDate) -> Penalty {
    if is_late(loan_date, returned_on) {
        Penalty::new(LATE_RETURN_PENALTY)
    } else {
        Penalty::NONE
    }
}

/// 純粋関数：資料を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再返却できない（return_dateは一度だけ設定される）
/// - 猶予期間を超えた場合は定額の延滞金
///
/// 副作用なし。新しいLoanを返す。
pub fn return_loan(loan: &Loan, returned_on: NaiveDate) -> Result<Loan, ReturnLoanError> {
    if loan.status.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(Loan {
        return_date: Some(returned_on),
        status: LoanStatus::Returned,
        penalty: penalty_for(loan.loan_date, returned_on),
        ..loan.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // TDD: borrow_item() のテスト
    #[test]
    fn test_borrow_item_creates_borrowed_loan() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));

        assert_eq!(loan.user_id, UserId::new(7));
        assert_eq!(loan.item_id, ItemId::new(42));
        assert_eq!(loan.loan_date, date(2024, 1, 1));
        assert_eq!(loan.status, LoanStatus::Borrowed);
        assert_eq!(loan.return_date, None);
        assert_eq!(loan.penalty, Penalty::NONE);
        assert!(loan.is_consistent());
    }

    #[test]
    fn test_borrow_item_assigns_distinct_ids() {
        let a = borrow_item(UserId::new(1), ItemId::new(1), date(2024, 1, 1));
        let b = borrow_item(UserId::new(1), ItemId::new(1), date(2024, 1, 1));
        assert_ne!(a.loan_id, b.loan_id);
    }

    // TDD: return_loan() のテスト
    #[test]
    fn test_return_after_nine_days_charges_penalty() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));

        let returned = return_loan(&loan, date(2024, 1, 9)).unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.return_date, Some(date(2024, 1, 9)));
        assert_eq!(returned.penalty.value(), 1000);
        assert!(returned.is_consistent());
    }

    #[test]
    fn test_return_on_day_seven_is_on_time() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));

        let returned = return_loan(&loan, date(2024, 1, 8)).unwrap();

        assert_eq!(returned.penalty, Penalty::NONE);
    }

    #[test]
    fn test_return_on_day_eight_is_late() {
        // 2024-01-09 - 7日 = 2024-01-02 は貸出日より後
        assert!(is_late(date(2024, 1, 1), date(2024, 1, 9)));
        // 2024-01-08 - 7日 = 2024-01-01 は貸出日と同日
        assert!(!is_late(date(2024, 1, 1), date(2024, 1, 8)));
    }

    #[test]
    fn test_return_same_day_is_on_time() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 3, 1));
        let returned = return_loan(&loan, date(2024, 3, 1)).unwrap();
        assert_eq!(returned.penalty, Penalty::NONE);
    }

    #[test]
    fn test_return_keeps_identity_fields() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));
        let returned = return_loan(&loan, date(2024, 1, 3)).unwrap();

        assert_eq!(returned.loan_id, loan.loan_id);
        assert_eq!(returned.user_id, loan.user_id);
        assert_eq!(returned.item_id, loan.item_id);
        assert_eq!(returned.loan_date, loan.loan_date);
    }

    #[test]
    fn test_return_fails_when_already_returned() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));
        let returned = return_loan(&loan, date(2024, 1, 2)).unwrap();

        let result = return_loan(&returned, date(2024, 1, 20));
        assert_eq!(result.unwrap_err(), ReturnLoanError::AlreadyReturned);
    }

    #[test]
    fn test_inconsistent_loan_is_detected() {
        let mut loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));
        loan.penalty = Penalty::new(1000);
        assert!(!loan.is_consistent());

        loan.penalty = Penalty::NONE;
        loan.return_date = Some(date(2024, 1, 2));
        assert!(!loan.is_consistent());
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [LoanStatus::Borrowed, LoanStatus::Returned] {
            let parsed: LoanStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("active".parse::<LoanStatus>().is_err());
    }
}
