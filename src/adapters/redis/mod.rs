pub mod notification_publisher;

pub use notification_publisher::NotificationPublisher as RedisNotificationPublisher;
