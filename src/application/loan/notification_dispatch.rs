use crate::domain::{PendingNotification, value_objects::UserId};
use crate::ports::{NotificationPublisher, UserDirectory, user_directory};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::saga::CollaboratorTimeouts;

/// 通知キューの既定の容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// 通知の非同期ディスパッチャ
///
/// 永続化チェックポイント後に通知を非ブロッキングなチャネルへ投入する。
/// 宛先の解決と配信はバックグラウンドのワーカーが行い、失敗はログに
/// 記録するのみで貸出・返却の結果には影響しない。
///
/// すべての送信側が破棄されるとワーカーは残りのキューを処理して終了する。
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<PendingNotification>,
}

impl NotificationDispatcher {
    /// ワーカーを起動してディスパッチャを作成する
    ///
    /// 返される`JoinHandle`はキューの排出完了を待つために使用できる。
    pub fn spawn(
        publisher: Arc<dyn NotificationPublisher>,
        directory: Arc<dyn UserDirectory>,
        timeouts: CollaboratorTimeouts,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = NotificationWorker {
            publisher,
            directory,
            timeouts,
        };
        let handle = tokio::spawn(worker.run(receiver));
        (Self { sender }, handle)
    }

    /// 通知をキューに投入する（待機しない）
    pub fn dispatch(&self, notification: PendingNotification) {
        let user_id = notification.user_id;
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    user_id = %user_id,
                    subject = %dropped.subject,
                    "Notification queue full, dropping notification"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(user_id = %user_id, "Notification worker stopped, dropping notification");
            }
        }
    }
}

struct NotificationWorker {
    publisher: Arc<dyn NotificationPublisher>,
    directory: Arc<dyn UserDirectory>,
    timeouts: CollaboratorTimeouts,
}

impl NotificationWorker {
    async fn run(self, mut receiver: mpsc::Receiver<PendingNotification>) {
        while let Some(notification) = receiver.recv().await {
            self.deliver(notification).await;
        }
        tracing::debug!("Notification worker drained");
    }

    async fn deliver(&self, notification: PendingNotification) {
        let user_id = notification.user_id;

        let email = match notification.email.clone() {
            Some(email) => email,
            None => match self.email_from_directory(user_id).await {
                Some(email) => email,
                None => {
                    tracing::warn!(
                        user_id = %user_id,
                        subject = %notification.subject,
                        "No email for user, notification skipped"
                    );
                    return;
                }
            },
        };

        let event = notification.addressed_to(email);
        match timeout(self.timeouts.notification, self.publisher.publish(&event)).await {
            Ok(Ok(())) => {
                tracing::info!(user_id = %user_id, subject = %event.subject, "Notification sent");
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to publish notification");
            }
            Err(_) => {
                tracing::warn!(user_id = %user_id, "Publishing notification timed out");
            }
        }
    }

    /// サービスアカウントでログインし、ディレクトリからメールアドレスを引く
    async fn lookup_email(&self, user_id: UserId) -> user_directory::Result<String> {
        let credential = self.directory.service_login().await?;
        self.directory.lookup_email(&credential, user_id).await
    }

    async fn email_from_directory(&self, user_id: UserId) -> Option<String> {
        match timeout(self.timeouts.directory, self.lookup_email(user_id)).await {
            Ok(Ok(email)) => {
                tracing::debug!(user_id = %user_id, "Fetched email from directory");
                Some(email)
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to fetch user email");
                None
            }
            Err(_) => {
                tracing::warn!(user_id = %user_id, "User directory lookup timed out");
                None
            }
        }
    }
}
