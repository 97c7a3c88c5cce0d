use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ItemId, Loan, UserId};

/// イベント：利用者へのメール通知
///
/// 通知チャネルに流れる唯一のメッセージ形式。
/// フィールド名は通知サービス側の形式（camelCase）に合わせる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub user_id: UserId,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// 宛先メールアドレス未確定の通知
///
/// メールアドレスはトークンのクレームから取得できない場合、
/// 通知ワーカー側でディレクトリ参照により解決される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub user_id: UserId,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
}

impl PendingNotification {
    /// 宛先を確定させて通知イベントにする
    pub fn addressed_to(self, email: String) -> NotificationEvent {
        NotificationEvent {
            user_id: self.user_id,
            email,
            subject: self.subject,
            message: self.message,
        }
    }
}

/// 純粋関数：貸出通知を組み立てる
pub fn borrowed_notice(
    user_id: UserId,
    item_id: ItemId,
    on: NaiveDate,
    email: Option<String>,
) -> PendingNotification {
    PendingNotification {
        user_id,
        email,
        subject: "Book Borrowed".to_string(),
        message: format!("You have borrowed book ID: {} on {}", item_id, on),
    }
}

/// 純粋関数：返却通知を組み立てる
///
/// 延滞金が発生した場合は本文末尾に金額を付記する。
pub fn returned_notice(loan: &Loan, on: NaiveDate, email: Option<String>) -> PendingNotification {
    let mut message = format!("You have returned book ID: {} on {}", loan.item_id, on);
    if loan.penalty.is_charged() {
        message.push_str(&format!(". Penalty: {}", loan.penalty.value()));
    }

    PendingNotification {
        user_id: loan.user_id,
        email,
        subject: "Book Returned".to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loan::{borrow_item, return_loan};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_borrowed_notice_text() {
        let notice = borrowed_notice(UserId::new(7), ItemId::new(42), date(2024, 1, 1), None);

        assert_eq!(notice.subject, "Book Borrowed");
        assert_eq!(notice.message, "You have borrowed book ID: 42 on 2024-01-01");
        assert_eq!(notice.email, None);
    }

    #[test]
    fn test_returned_notice_mentions_penalty_only_when_charged() {
        let loan = borrow_item(UserId::new(7), ItemId::new(42), date(2024, 1, 1));

        let on_time = return_loan(&loan, date(2024, 1, 5)).unwrap();
        let notice = returned_notice(&on_time, date(2024, 1, 5), None);
        assert_eq!(notice.message, "You have returned book ID: 42 on 2024-01-05");

        let late = return_loan(&loan, date(2024, 1, 20)).unwrap();
        let notice = returned_notice(&late, date(2024, 1, 20), None);
        assert_eq!(
            notice.message,
            "You have returned book ID: 42 on 2024-01-20. Penalty: 1000"
        );
    }

    #[test]
    fn test_notification_event_wire_format() {
        let event = borrowed_notice(UserId::new(7), ItemId::new(42), date(2024, 1, 1), None)
            .addressed_to("reader@example.com".to_string());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["email"], "reader@example.com");
        assert_eq!(json["subject"], "Book Borrowed");
    }
}
