//! Types and functions for storing and loading items.

use crate::infra::{database::DbPool, error::ApiResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tokio::sync::RwLock;
use tracing::{instrument, Instrument};
use utoipa::ToSchema;

/// A new item, as submitted by a client.
///
/// Both fields are optional here so that a missing name or price is reported
/// as an invalid item rather than as a malformed request. The price keeps the
/// exact text of the JSON number so that validation sees every digit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewItem {
    /// The item's name.
    #[schema(example = "Burger")]
    pub name: Option<String>,
    /// The item's price.
    #[schema(value_type = Option<f64>, example = 1.99)]
    pub price: Option<Number>,
}

/// A new item that passed validation and can be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidItem {
    pub(crate) name: String,
    pub(crate) price: Decimal,
}

impl ValidItem {
    /// The item's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The item's price, always greater than zero.
    pub fn price(&self) -> Decimal {
        self.price
    }
}

/// An existing item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Item {
    /// The item's id.
    pub id: i64,
    /// The item's name.
    #[schema(example = "Burger")]
    pub name: String,
    /// The item's price.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 1.99)]
    pub price: Decimal,
    /// The order this item belongs to, if any.
    #[serde(skip)]
    pub order_id: Option<i64>,
}

/// Anything that can store and list items.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ItemRepository: Send + Sync {
    /// Stores a new item, assigning it an id.
    async fn create_item(&self, item: ValidItem) -> ApiResult<Item>;

    /// Lists all items in the order they were stored.
    async fn list_items(&self) -> ApiResult<Vec<Item>>;
}

/// An item repository backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgItemRepository {
    db: DbPool,
}

impl PgItemRepository {
    /// Creates a new repository.
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self))]
    async fn create_item(&self, new_item: ValidItem) -> ApiResult<Item> {
        tracing::info!("Creating item {:?}", new_item);
        let mut tx = self.db.begin().await?;
        let item = sqlx::query_as::<_, Item>(
            r#"
                INSERT INTO items (name, price)
                VALUES ($1, $2)
                RETURNING id, name, price, order_id
            "#,
        )
        .bind(new_item.name)
        .bind(new_item.price)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn list_items(&self) -> ApiResult<Vec<Item>> {
        tracing::info!("Listing items");
        let items = sqlx::query_as::<_, Item>(
            r#"
                SELECT id, name, price, order_id FROM items
                ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .instrument(tracing::info_span!("fetch_all"))
        .await?;
        tracing::info!("Listed {} items", items.len());
        Ok(items)
    }
}

/// An item repository that lives in process memory.
///
/// Ids are assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryItemRepository {
    items: RwLock<Vec<Item>>,
}

impl MemoryItemRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ItemRepository for MemoryItemRepository {
    #[instrument(skip(self))]
    async fn create_item(&self, new_item: ValidItem) -> ApiResult<Item> {
        let mut items = self.items.write().await;
        let item = Item {
            id: items.len() as i64 + 1,
            name: new_item.name,
            price: new_item.price,
            order_id: None,
        };
        items.push(item.clone());
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn list_items(&self) -> ApiResult<Vec<Item>> {
        let items = self.items.read().await.clone();
        tracing::info!("Listed {} items", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid(name: &str, price: Decimal) -> ValidItem {
        ValidItem {
            name: name.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn memory_repository_starts_empty() {
        let repo = MemoryItemRepository::new();
        assert!(repo.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_repository_assigns_ids_in_insertion_order() {
        let repo = MemoryItemRepository::new();
        let burger = repo.create_item(valid("Burger", dec!(1.99))).await.unwrap();
        let fries = repo.create_item(valid("Fries", dec!(0.99))).await.unwrap();
        assert_eq!(1, burger.id);
        assert_eq!(2, fries.id);
        assert_eq!(vec![burger, fries], repo.list_items().await.unwrap());
    }

    #[test]
    fn item_json_has_numeric_price_and_no_order() {
        let item = Item {
            id: 1,
            name: "Burger".to_string(),
            price: dec!(1.99),
            order_id: Some(7),
        };
        assert_eq!(
            serde_json::json!({ "id": 1, "name": "Burger", "price": 1.99 }),
            serde_json::to_value(&item).unwrap()
        );
    }

    #[test]
    fn new_item_fields_may_be_missing_or_null() {
        let item: NewItem = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(NewItem::default(), item);

        let item: NewItem =
            serde_json::from_str(r#"{"id": 1, "name": "Burger", "price": 1.99}"#).unwrap();
        assert_eq!(Some("Burger"), item.name.as_deref());
        assert_eq!("1.99", item.price.unwrap().to_string());
    }

    #[test]
    fn new_item_price_keeps_every_digit() {
        let item: NewItem =
            serde_json::from_str(r#"{"price": 12345678901234567.890000000001}"#).unwrap();
        assert_eq!("12345678901234567.890000000001", item.price.unwrap().to_string());

        let item: NewItem = serde_json::from_str(r#"{"price": 1e-30}"#).unwrap();
        assert_eq!("1e-30", item.price.unwrap().to_string());
    }

    #[test]
    fn item_price_is_written_exactly() {
        let item = Item {
            id: 1,
            name: "Burger".to_string(),
            price: dec!(12345678901234567.89),
            order_id: None,
        };
        assert_eq!(
            r#"{"id":1,"name":"Burger","price":12345678901234567.89}"#,
            serde_json::to_string(&item).unwrap()
        );
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL database in DATABASE_URL"]
    async fn postgres_repository_creates_and_lists(db: DbPool) {
        let repo = PgItemRepository::new(db);
        assert!(repo.list_items().await.unwrap().is_empty());

        let burger = repo.create_item(valid("Burger", dec!(1.99))).await.unwrap();
        let fries = repo.create_item(valid("Fries", dec!(0.99))).await.unwrap();
        assert_eq!("Burger", burger.name);
        assert_eq!(dec!(1.99), burger.price);
        assert_eq!(None, burger.order_id);
        assert!(fries.id > burger.id);

        assert_eq!(vec![burger, fries], repo.list_items().await.unwrap());
    }
}
