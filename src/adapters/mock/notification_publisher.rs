use crate::domain::NotificationEvent;
use crate::ports::notification_publisher::{
    NotificationPublisher as NotificationPublisherTrait, Result,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// NotificationPublisherのモック実装
///
/// 実際の配信は行わず、投入されたイベントを記録する。
/// ブローカー停止と応答遅延を模擬できる。
#[derive(Debug, Default)]
pub struct NotificationPublisher {
    published: Mutex<Vec<NotificationEvent>>,
    unreachable: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

impl NotificationPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// ブローカー停止を模擬する
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// 投入されたイベント
    pub fn published(&self) -> Vec<NotificationEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationPublisherTrait for NotificationPublisher {
    async fn publish(&self, event: &NotificationEvent) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.unreachable.lock().unwrap() {
            return Err("broker unavailable".into());
        }
        self.published.lock().unwrap().push(event.clone());
        Ok(())
    }
}
