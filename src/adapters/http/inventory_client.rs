use crate::domain::value_objects::ItemId;
use crate::ports::inventory_client::{
    InventoryClient as InventoryClientTrait, InventoryError, ItemSnapshot, Result,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// カタログサービスのレスポンス封筒
///
/// 資料が存在しない場合もHTTP 200で`data: null`が返る。
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

/// カタログサービス上の資料表現
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogItem {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    isbn: Option<String>,
    stock: i32,
}

impl From<CatalogItem> for ItemSnapshot {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: ItemId::new(item.id),
            title: item.title.unwrap_or_default(),
            author: item.author.unwrap_or_default(),
            publisher: item.publisher.unwrap_or_default(),
            isbn: item.isbn.unwrap_or_default(),
            stock: item.stock,
        }
    }
}

impl From<&ItemSnapshot> for CatalogItem {
    fn from(snapshot: &ItemSnapshot) -> Self {
        Self {
            id: snapshot.id.value(),
            title: Some(snapshot.title.clone()),
            author: Some(snapshot.author.clone()),
            publisher: Some(snapshot.publisher.clone()),
            isbn: Some(snapshot.isbn.clone()),
            stock: snapshot.stock,
        }
    }
}

/// InventoryClientのHTTP実装（カタログサービス）
///
/// `base_url`は資料リソースのURL（例: `http://catalog-service/api/catalog/books`）。
/// カタログサービスは部分更新を持たないため、在庫更新は全項目のPUTで行う。
pub struct InventoryClient {
    http: Client,
    base_url: String,
}

impl InventoryClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn item_url(&self, item_id: ItemId) -> String {
        format!("{}/{}", self.base_url, item_id)
    }
}

#[async_trait]
impl InventoryClientTrait for InventoryClient {
    async fn get_item(&self, item_id: ItemId) -> Result<ItemSnapshot> {
        let response = self
            .http
            .get(self.item_url(item_id))
            .send()
            .await
            .map_err(|e| InventoryError::Unavailable(Box::new(e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(item_id));
        }

        let response = response
            .error_for_status()
            .map_err(|e| InventoryError::Unavailable(Box::new(e)))?;

        let envelope: ApiEnvelope<CatalogItem> = response
            .json()
            .await
            .map_err(|e| InventoryError::Unavailable(Box::new(e)))?;

        match envelope.data {
            Some(item) => Ok(item.into()),
            None => {
                tracing::debug!(
                    item_id = %item_id,
                    message = envelope.message.as_deref().unwrap_or("Unknown error"),
                    "Catalog returned no item"
                );
                Err(InventoryError::NotFound(item_id))
            }
        }
    }

    async fn update_stock(
        &self,
        item_id: ItemId,
        new_stock: i32,
        snapshot: &ItemSnapshot,
    ) -> Result<()> {
        let body = CatalogItem::from(&snapshot.with_stock(new_stock));

        let response = self
            .http
            .put(self.item_url(item_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| InventoryError::Unavailable(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(InventoryError::Rejected(format!(
                "Failed to update book stock: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data_parses() {
        let json = r#"{"status":"error","message":"Book not found","data":null}"#;
        let envelope: ApiEnvelope<CatalogItem> = serde_json::from_str(json).unwrap();

        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Book not found"));
    }

    #[test]
    fn test_catalog_item_ignores_extra_fields() {
        let json = r#"{
            "status": "success",
            "message": "Book retrieved successfully",
            "data": {
                "id": 42, "title": "Dune", "author": "Herbert", "publisher": "Chilton",
                "isbn": "978-0", "stock": 3, "coverUrl": "http://x", "isDeleted": false
            }
        }"#;
        let envelope: ApiEnvelope<CatalogItem> = serde_json::from_str(json).unwrap();
        let snapshot: ItemSnapshot = envelope.data.unwrap().into();

        assert_eq!(snapshot.id, ItemId::new(42));
        assert_eq!(snapshot.stock, 3);
        assert_eq!(snapshot.title, "Dune");
    }

    #[test]
    fn test_update_body_echoes_descriptive_fields() {
        let snapshot = ItemSnapshot {
            id: ItemId::new(42),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            publisher: "Chilton".to_string(),
            isbn: "978-0".to_string(),
            stock: 3,
        };

        let body = serde_json::to_value(CatalogItem::from(&snapshot.with_stock(2))).unwrap();

        assert_eq!(body["stock"], 2);
        assert_eq!(body["title"], "Dune");
        assert_eq!(body["isbn"], "978-0");
    }

    #[test]
    fn test_item_url_trims_trailing_slash() {
        let client = InventoryClient::new(Client::new(), "http://catalog/api/catalog/books/");
        assert_eq!(
            client.item_url(ItemId::new(5)),
            "http://catalog/api/catalog/books/5"
        );
    }
}
