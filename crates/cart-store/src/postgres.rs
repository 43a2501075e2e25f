use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CartId, CartRecord, CustomerId, ItemId, ItemRecord, ProductId, Result, StoreError, StoredCart,
    Version,
    store::{CartCommand, CartStore, CommitOptions},
};

/// PostgreSQL-backed cart store implementation.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` with a default pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_item(row: PgRow) -> Result<ItemRecord> {
        Ok(ItemRecord {
            item_id: ItemId::from_uuid(row.try_get::<Uuid, _>("item_id")?),
            cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("cart_id")?),
            product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
            product_name: row.try_get("product_name")?,
            image_url: row.try_get("image_url")?,
            unit_price_cents: row.try_get("unit_price_cents")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn find_cart(&self, customer_id: CustomerId) -> Result<Option<StoredCart>> {
        let cart_row = sqlx::query(
            r#"
            SELECT cart_id, customer_id, voucher, version
            FROM carts
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(cart_row) = cart_row else {
            return Ok(None);
        };

        let cart_id = CartId::from_uuid(cart_row.try_get::<Uuid, _>("cart_id")?);
        let cart = CartRecord {
            cart_id,
            customer_id: CustomerId::from_uuid(cart_row.try_get::<Uuid, _>("customer_id")?),
            voucher: cart_row.try_get("voucher")?,
        };
        let version = Version::new(cart_row.try_get("version")?);

        let item_rows = sqlx::query(
            r#"
            SELECT item_id, cart_id, product_id, product_name, image_url, unit_price_cents, quantity
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(StoredCart {
            cart,
            items,
            version,
        }))
    }

    async fn commit(
        &self,
        cart_id: CartId,
        commands: Vec<CartCommand>,
        options: CommitOptions,
    ) -> Result<Version> {
        if commands.is_empty() {
            return Err(StoreError::NothingCommitted { cart_id });
        }

        // Single transaction for the whole batch: all or nothing.
        let mut tx = self.pool.begin().await?;

        let current_version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM carts WHERE cart_id = $1 FOR UPDATE")
                .bind(cart_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        let actual = Version::new(current_version.unwrap_or(0));

        if let Some(expected) = options.expected_version
            && actual != expected
        {
            tracing::debug!(%cart_id, %expected, %actual, "version conflict, rolling back");
            return Err(StoreError::ConcurrentModification {
                cart_id,
                expected,
                actual,
            });
        }

        let new_version = actual.next();
        let mut affected = 0u64;

        for command in &commands {
            match command {
                CartCommand::UpsertCart(record) => {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO carts (cart_id, customer_id, voucher, version)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (cart_id)
                        DO UPDATE SET voucher = excluded.voucher
                        "#,
                    )
                    .bind(record.cart_id.as_uuid())
                    .bind(record.customer_id.as_uuid())
                    .bind(&record.voucher)
                    .bind(new_version.as_i64())
                    .execute(&mut *tx)
                    .await;
                    // Two first-time writers for the same customer both pass
                    // the version check; the loser trips the unique customer
                    // constraint, which is a concurrency conflict, not an
                    // infrastructure failure.
                    let result = match result {
                        Ok(result) => result,
                        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                            tracing::debug!(%cart_id, "unique violation on cart insert, rolling back");
                            return Err(StoreError::ConcurrentModification {
                                cart_id,
                                expected: options.expected_version.unwrap_or_else(Version::initial),
                                actual: new_version,
                            });
                        }
                        Err(err) => return Err(err.into()),
                    };
                    affected += result.rows_affected();
                }
                CartCommand::UpsertItem(record) => {
                    let result = sqlx::query(
                        r#"
                        INSERT INTO cart_items
                            (item_id, cart_id, product_id, product_name, image_url, unit_price_cents, quantity)
                        VALUES ($1, $2, $3, $4, $5, $6, $7)
                        ON CONFLICT (cart_id, product_id)
                        DO UPDATE SET
                            quantity = excluded.quantity,
                            product_name = excluded.product_name,
                            image_url = excluded.image_url,
                            unit_price_cents = excluded.unit_price_cents
                        "#,
                    )
                    .bind(record.item_id.as_uuid())
                    .bind(record.cart_id.as_uuid())
                    .bind(record.product_id.as_str())
                    .bind(&record.product_name)
                    .bind(&record.image_url)
                    .bind(record.unit_price_cents)
                    .bind(record.quantity)
                    .execute(&mut *tx)
                    .await?;
                    affected += result.rows_affected();
                }
                CartCommand::DeleteItem {
                    cart_id: target,
                    product_id,
                } => {
                    let result =
                        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                            .bind(target.as_uuid())
                            .bind(product_id.as_str())
                            .execute(&mut *tx)
                            .await?;
                    affected += result.rows_affected();
                }
            }
        }

        if affected == 0 {
            return Err(StoreError::NothingCommitted { cart_id });
        }

        let bump = sqlx::query("UPDATE carts SET version = $1 WHERE cart_id = $2")
            .bind(new_version.as_i64())
            .bind(cart_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        if bump.rows_affected() == 0 {
            return Err(StoreError::NothingCommitted { cart_id });
        }

        tx.commit().await?;
        Ok(new_version)
    }
}
