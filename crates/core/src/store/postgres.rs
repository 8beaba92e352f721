//! Postgres-backed stores.
//!
//! Queries are runtime-checked `query_as` calls against the schema in
//! `crates/core/migrations/`. Enum columns are stored as text and parsed back
//! through the domain `FromStr` impls; a value that fails to parse surfaces
//! as [`StoreError::DataCorruption`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, QueryBuilder};

use crate::error::StoreError;
use crate::model::{
    AuditFilter, AuditLogEntry, Flavor, NewAuditEntry, Order, OrderFilter, Product,
};
use crate::store::{AuditStore, CatalogStore, OrderStore};
use crate::types::{
    AdminUserId, AuditLogId, Email, FlavorId, Money, OrderId, ProductId,
};

/// Postgres implementation of the catalog, order, and audit stores.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    category: Option<String>,
    price: Money,
    image_url: Option<String>,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, flavors: Vec<Flavor>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            image_url: self.image_url,
            available: self.available,
            flavors,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FlavorRow {
    id: FlavorId,
    product_id: ProductId,
    name: String,
    price_modifier: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FlavorRow> for Flavor {
    fn from(row: FlavorRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            price_modifier: row.price_modifier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    client_name: String,
    client_phone: String,
    client_email: Option<Email>,
    items: serde_json::Value,
    total_price: Money,
    payment_method: String,
    payment_status: String,
    status: String,
    pickup_or_delivery_date: DateTime<Utc>,
    notes: Option<String>,
    notes_admin: Option<String>,
    provider_payment_id: Option<String>,
    last_modified_by: Option<AdminUserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let items = serde_json::from_value(row.items)
            .map_err(|e| StoreError::DataCorruption(format!("invalid order items: {e}")))?;
        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            client_name: row.client_name,
            client_phone: row.client_phone,
            client_email: row.client_email,
            items,
            total_price: row.total_price,
            payment_method: row
                .payment_method
                .parse()
                .map_err(StoreError::DataCorruption)?,
            payment_status: row
                .payment_status
                .parse()
                .map_err(StoreError::DataCorruption)?,
            status: row.status.parse().map_err(StoreError::DataCorruption)?,
            pickup_or_delivery_date: row.pickup_or_delivery_date,
            notes: row.notes,
            notes_admin: row.notes_admin,
            provider_payment_id: row.provider_payment_id,
            last_modified_by: row.last_modified_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: AuditLogId,
    action: String,
    order_id: Option<OrderId>,
    admin_user_id: Option<AdminUserId>,
    old_values: Option<serde_json::Value>,
    new_values: Option<serde_json::Value>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(row: AuditRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.id,
            action: row.action.parse().map_err(StoreError::DataCorruption)?,
            order_id: row.order_id,
            admin_user_id: row.admin_user_id,
            old_values: row.old_values,
            new_values: row.new_values,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

const ORDER_COLUMNS: &str = "id, order_number, client_name, client_phone, client_email, items, \
     total_price, payment_method, payment_status, status, pickup_or_delivery_date, notes, \
     notes_admin, provider_payment_id, last_modified_by, created_at, updated_at";

fn items_json(order: &Order) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(&order.items)
        .map_err(|e| StoreError::Database(format!("cannot serialize order items: {e}")))
}

async fn load_flavors(pool: &PgPool, product_ids: &[ProductId]) -> Result<Vec<Flavor>, StoreError> {
    let ids: Vec<uuid::Uuid> = product_ids.iter().map(|id| id.as_uuid()).collect();
    let rows: Vec<FlavorRow> = sqlx::query_as(
        "SELECT id, product_id, name, price_modifier, created_at, updated_at \
         FROM product_flavors WHERE product_id = ANY($1) ORDER BY created_at",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Flavor::from).collect())
}

async fn insert_audit_entry(
    conn: &mut PgConnection,
    entry: NewAuditEntry,
) -> Result<AuditLogEntry, StoreError> {
    let entry = entry.into_entry();
    sqlx::query(
        "INSERT INTO audit_logs \
         (id, action, order_id, admin_user_id, old_values, new_values, description, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(entry.id)
    .bind(entry.action.as_str())
    .bind(entry.order_id)
    .bind(entry.admin_user_id)
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .bind(&entry.description)
    .bind(entry.created_at)
    .execute(conn)
    .await?;
    Ok(entry)
}

// =============================================================================
// CatalogStore
// =============================================================================

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, category, price, image_url, available, \
             created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let flavors = load_flavors(&self.pool, &[row.id]).await?;
                Ok(Some(row.into_product(flavors)))
            }
            None => Ok(None),
        }
    }

    async fn list_products(&self, only_available: bool) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, category, price, image_url, available, \
             created_at, updated_at FROM products WHERE available OR NOT $1 ORDER BY name",
        )
        .bind(only_available)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<ProductId> = rows.iter().map(|r| r.id).collect();
        let mut flavors_by_product: std::collections::HashMap<ProductId, Vec<Flavor>> =
            std::collections::HashMap::new();
        for flavor in load_flavors(&self.pool, &ids).await? {
            flavors_by_product
                .entry(flavor.product_id)
                .or_default()
                .push(flavor);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let flavors = flavors_by_product.remove(&row.id).unwrap_or_default();
                row.into_product(flavors)
            })
            .collect())
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            "INSERT INTO products \
             (id, name, description, category, price, image_url, available, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(product)
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE products SET name = $2, description = $3, category = $4, price = $5, \
             image_url = $6, available = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.available)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        // product_flavors rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_flavor(&self, id: FlavorId) -> Result<Option<Flavor>, StoreError> {
        let row: Option<FlavorRow> = sqlx::query_as(
            "SELECT id, product_id, name, price_modifier, created_at, updated_at \
             FROM product_flavors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Flavor::from))
    }

    async fn insert_flavor(&self, flavor: Flavor) -> Result<Flavor, StoreError> {
        sqlx::query(
            "INSERT INTO product_flavors \
             (id, product_id, name, price_modifier, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(flavor.id)
        .bind(flavor.product_id)
        .bind(&flavor.name)
        .bind(flavor.price_modifier)
        .bind(flavor.created_at)
        .bind(flavor.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(flavor)
    }

    async fn update_flavor(&self, flavor: &Flavor) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE product_flavors SET name = $2, price_modifier = $3, updated_at = $4 \
             WHERE id = $1",
        )
        .bind(flavor.id)
        .bind(&flavor.name)
        .bind(flavor.price_modifier)
        .bind(flavor.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_flavor(&self, id: FlavorId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM product_flavors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// OrderStore
// =============================================================================

#[async_trait]
impl OrderStore for PgStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
        ))
        .bind(order.id)
        .bind(&order.order_number)
        .bind(&order.client_name)
        .bind(&order.client_phone)
        .bind(&order.client_email)
        .bind(items_json(&order)?)
        .bind(order.total_price)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.status.as_str())
        .bind(order.pickup_or_delivery_date)
        .bind(&order.notes)
        .bind(&order.notes_admin)
        .bind(&order.provider_payment_id)
        .bind(order.last_modified_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Order::try_from).transpose()
    }

    async fn find_by_provider_payment_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE provider_payment_id = $1"
        ))
        .bind(provider_payment_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let mut qb = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE true"));
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(payment_status) = filter.payment_status {
            qb.push(" AND payment_status = ")
                .push_bind(payment_status.as_str());
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND pickup_or_delivery_date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND pickup_or_delivery_date <= ").push_bind(to);
        }
        qb.push(" ORDER BY created_at DESC");

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_by_pickup_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE pickup_or_delivery_date >= $1 AND pickup_or_delivery_date <= $2 \
             ORDER BY pickup_or_delivery_date"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_with_audit(
        &self,
        order: &Order,
        audit: Option<NewAuditEntry>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE orders SET status = $2, payment_status = $3, notes_admin = $4, \
             provider_payment_id = $5, last_modified_by = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.notes_admin)
        .bind(&order.provider_payment_id)
        .bind(order.last_modified_by)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(entry) = audit {
            insert_audit_entry(&mut *tx, entry).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// AuditStore
// =============================================================================

#[async_trait]
impl AuditStore for PgStore {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditLogEntry, StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_audit_entry(&mut *conn, entry).await
    }

    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, StoreError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, action, order_id, admin_user_id, old_values, new_values, description, \
             created_at FROM audit_logs WHERE true",
        );
        if let Some(action) = filter.action {
            qb.push(" AND action = ").push_bind(action.as_str());
        }
        if let Some(order_id) = filter.order_id {
            qb.push(" AND order_id = ").push_bind(order_id);
        }
        if let Some(from) = filter.from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            qb.push(" AND created_at <= ").push_bind(to);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::try_from(filter.limit).unwrap_or(50))
            .push(" OFFSET ")
            .push_bind(i64::try_from(filter.offset).unwrap_or(0));

        let rows: Vec<AuditRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }
}
