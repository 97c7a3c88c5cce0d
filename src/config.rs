//! 設定の読み込み
//!
//! 優先順位（後勝ち）：`config/default` → `config/{RUN_MODE}` → `LOANS__*` 環境変数
//! → `DATABASE_URL` / `JWT_SECRET` / `REDIS_URL`

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::application::loan::{CollaboratorTimeouts, DEFAULT_QUEUE_CAPACITY};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// 在庫（カタログ）サービス
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InventoryConfig {
    pub base_url: String,
}

/// 利用者ディレクトリ（メールアドレスの参照先）
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    pub service_username: String,
    pub service_password: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub redis_url: String,
    pub routing_key: String,
    pub queue_capacity: usize,
}

/// 協調サービスごとのタイムアウト（ミリ秒）
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimeoutConfig {
    pub verifier_ms: u64,
    pub inventory_ms: u64,
    pub loan_store_ms: u64,
    pub notification_ms: u64,
    pub directory_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `pretty` または `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub inventory: InventoryConfig,
    pub directory: DirectoryConfig,
    pub notification: NotificationConfig,
    pub timeouts: TimeoutConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 設定ファイルと環境変数から読み込む
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LOANS__SERVER__PORT=8080 のように指定する
            .add_source(
                Environment::with_prefix("LOANS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("notification.redis_url", env::var("REDIS_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn timeouts(&self) -> CollaboratorTimeouts {
        CollaboratorTimeouts {
            verifier: Duration::from_millis(self.timeouts.verifier_ms),
            inventory: Duration::from_millis(self.timeouts.inventory_ms),
            loan_store: Duration::from_millis(self.timeouts.loan_store_ms),
            notification: Duration::from_millis(self.timeouts.notification_ms),
            directory: Duration::from_millis(self.timeouts.directory_ms),
        }
    }

    pub fn uses_json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/library_loans".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081/api/catalog/books".to_string(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            service_username: "loan-service".to_string(),
            service_password: String::new(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            routing_key: "notification.email".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let defaults = CollaboratorTimeouts::default();
        Self {
            verifier_ms: defaults.verifier.as_millis() as u64,
            inventory_ms: defaults.inventory.as_millis() as u64,
            loan_store_ms: defaults.loan_store.as_millis() as u64,
            notification_ms: defaults.notification.as_millis() as u64,
            directory_ms: defaults.directory.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
        }
    }
}
