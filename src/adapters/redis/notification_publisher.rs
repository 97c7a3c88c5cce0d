use crate::domain::NotificationEvent;
use crate::ports::notification_publisher::{
    NotificationPublisher as NotificationPublisherTrait, Result,
};
use async_trait::async_trait;
use redis::{AsyncCommands, Client};

/// NotificationPublisherのRedis実装
///
/// ルーティングキー名のリストにJSONを追記する。通知サービスは
/// 同じリストを先頭から取り出して配信する（少なくとも1回）。
pub struct NotificationPublisher {
    client: Client,
    routing_key: String,
}

impl NotificationPublisher {
    /// Redis URLから新しいNotificationPublisherを作成
    ///
    /// 接続は遅延確立のため、ブローカー停止中でも作成できる。
    pub fn new(url: &str, routing_key: impl Into<String>) -> Result<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            routing_key: routing_key.into(),
        })
    }
}

#[async_trait]
impl NotificationPublisherTrait for NotificationPublisher {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.rpush::<_, _, ()>(&self.routing_key, payload).await?;

        tracing::info!(
            user_id = %event.user_id,
            subject = %event.subject,
            routing_key = %self.routing_key,
            "Notification enqueued"
        );
        Ok(())
    }
}
