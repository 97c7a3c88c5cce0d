use crate::domain::value_objects::ItemId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 在庫サービスのエラー
#[derive(Debug, Error)]
pub enum InventoryError {
    /// 資料が存在しない
    #[error("Item {0} not found")]
    NotFound(ItemId),

    /// 通信障害・タイムアウト
    #[error("Inventory service unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 在庫サービスが更新を拒否した（非成功ステータス、在庫の競合）
    #[error("Inventory update rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, InventoryError>;

/// 資料の在庫スナップショット
///
/// 在庫サービスが所有するデータの読み書き用ビュー。
/// 在庫更新は全項目の置き換えのため、記述項目はそのまま送り返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub stock: i32,
}

impl ItemSnapshot {
    /// 在庫数だけを差し替えた更新内容を作る
    pub fn with_stock(&self, stock: i32) -> Self {
        Self {
            stock,
            ..self.clone()
        }
    }
}

/// 在庫サービスポート
///
/// 貸出コンテキストとカタログコンテキストの境界を維持する。
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// 資料の在庫スナップショットを取得する
    async fn get_item(&self, item_id: ItemId) -> Result<ItemSnapshot>;

    /// 資料の在庫数を更新する
    ///
    /// `snapshot`は新しい在庫数の計算元。比較交換に対応した在庫サービスでは
    /// `snapshot.stock`が現在値と一致しない書き込みは`Rejected`になる。
    async fn update_stock(
        &self,
        item_id: ItemId,
        new_stock: i32,
        snapshot: &ItemSnapshot,
    ) -> Result<()>;
}
