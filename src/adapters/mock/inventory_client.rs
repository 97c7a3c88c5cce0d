use crate::domain::value_objects::ItemId;
use crate::ports::inventory_client::{
    InventoryClient as InventoryClientTrait, InventoryError, ItemSnapshot, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct InventoryState {
    items: HashMap<ItemId, ItemSnapshot>,
    unavailable: bool,
    reject_updates: bool,
    update_count: usize,
    delay: Option<Duration>,
}

/// InventoryClientのインメモリ実装
///
/// 資料を登録することで状態を持ったテストをサポート。
/// 在庫更新は比較交換で行い、計算元のスナップショットと現在の在庫数が
/// 異なる書き込みは拒否する。
#[derive(Debug, Default)]
pub struct InventoryClient {
    state: Mutex<InventoryState>,
}

impl InventoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用に資料を登録
    pub fn add_item(&self, item_id: ItemId, stock: i32) {
        let snapshot = ItemSnapshot {
            id: item_id,
            title: format!("Item {}", item_id),
            author: "Mock Author".to_string(),
            publisher: "Mock Publisher".to_string(),
            isbn: format!("isbn-{}", item_id),
            stock,
        };
        self.state.lock().unwrap().items.insert(item_id, snapshot);
    }

    /// 現在の在庫数
    pub fn stock_of(&self, item_id: ItemId) -> Option<i32> {
        self.state
            .lock()
            .unwrap()
            .items
            .get(&item_id)
            .map(|item| item.stock)
    }

    /// 現在のスナップショット
    pub fn snapshot_of(&self, item_id: ItemId) -> Option<ItemSnapshot> {
        self.state.lock().unwrap().items.get(&item_id).cloned()
    }

    /// 通信障害を模擬する（取得・更新とも失敗）
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// 更新のみ非成功ステータスで拒否する
    pub fn set_reject_updates(&self, reject: bool) {
        self.state.lock().unwrap().reject_updates = reject;
    }

    /// 取得・更新の前に遅延を入れる
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().unwrap().delay = delay;
    }

    /// 成功した在庫更新の回数
    pub fn update_count(&self) -> usize {
        self.state.lock().unwrap().update_count
    }
}

impl InventoryClient {
    async fn wait(&self) {
        let delay = self.state.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn unavailable() -> InventoryError {
    InventoryError::Unavailable("connection refused".into())
}

#[async_trait]
impl InventoryClientTrait for InventoryClient {
    async fn get_item(&self, item_id: ItemId) -> Result<ItemSnapshot> {
        self.wait().await;
        let state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(unavailable());
        }
        state
            .items
            .get(&item_id)
            .cloned()
            .ok_or(InventoryError::NotFound(item_id))
    }

    async fn update_stock(
        &self,
        item_id: ItemId,
        new_stock: i32,
        snapshot: &ItemSnapshot,
    ) -> Result<()> {
        self.wait().await;
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(unavailable());
        }
        if state.reject_updates {
            return Err(InventoryError::Rejected("500 Internal Server Error".to_string()));
        }

        let current = state
            .items
            .get_mut(&item_id)
            .ok_or(InventoryError::NotFound(item_id))?;
        if current.stock != snapshot.stock {
            return Err(InventoryError::Rejected(format!(
                "stock changed from {} to {}",
                snapshot.stock, current.stock
            )));
        }

        *current = snapshot.with_stock(new_stock);
        state.update_count += 1;
        Ok(())
    }
}
