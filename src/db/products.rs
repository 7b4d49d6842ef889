//! Product store operations.
//!
//! Mutations take the active transaction handle from
//! [`Database::with_transaction`](crate::db::Database::with_transaction),
//! so every write is atomic with the rest of its unit of work. Reads accept
//! any executor.

use sqlx::PgExecutor;
use tracing::{debug, error};

use crate::db::postgres::PgTx;
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product};

/// Insert a product. The id is omitted and assigned by the store.
pub async fn create(tx: &mut PgTx, product: &NewProduct) -> Result<Product> {
    let created = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, price, stock)
        VALUES ($1, $2, $3)
        RETURNING id, name, price, stock, created_at, updated_at, deleted_at
        "#,
    )
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        error!(error = %e, name = %product.name, "failed to insert product");
        AppError::Database(e)
    })?;

    debug!(id = created.id, name = %created.name, "product created");
    Ok(created)
}

/// Full-row update keyed by id, replacing all mutable fields.
///
/// Returns the number of rows affected; 0 means no row matched the id and
/// the caller decides whether that is an error.
pub async fn update(tx: &mut PgTx, id: i64, product: &NewProduct) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = $2, price = $3, stock = $4, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.stock)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        error!(error = %e, id, "failed to update product");
        AppError::Database(e)
    })?;

    Ok(result.rows_affected())
}

/// Mark the product deleted. The row stays in place and remains visible to
/// unscoped reads.
pub async fn soft_delete(tx: &mut PgTx, id: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        error!(error = %e, id, "failed to soft-delete product");
        AppError::Database(e)
    })?;

    Ok(result.rows_affected())
}

/// Physically remove the row, soft-deleted or not.
pub async fn hard_delete(tx: &mut PgTx, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            error!(error = %e, id, "failed to hard-delete product");
            AppError::Database(e)
        })?;

    Ok(result.rows_affected())
}

/// Fetch by id, excluding soft-deleted rows.
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Product>>
where
    E: PgExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, created_at, updated_at, deleted_at
        FROM products
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Fetch by id including soft-deleted rows.
pub async fn find_by_id_unscoped<'e, E>(executor: E, id: i64) -> Result<Option<Product>>
where
    E: PgExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, created_at, updated_at, deleted_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Fetch by name, excluding soft-deleted rows.
pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Product>>
where
    E: PgExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, created_at, updated_at, deleted_at
        FROM products
        WHERE name = $1 AND deleted_at IS NULL
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}
