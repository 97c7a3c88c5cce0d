use crate::domain::NotificationEvent;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知配信ポート
///
/// 永続的なメッセージチャネルへの投入を抽象化する。
/// 配信は少なくとも1回、呼び出し側から見て非同期。
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// 通知イベントをキューに投入する
    async fn publish(&self, event: &NotificationEvent) -> Result<()>;
}
