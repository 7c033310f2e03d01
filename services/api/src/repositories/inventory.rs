//! Inventory repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::inventory::{Fields, InventoryRecord};

/// Repository over the three inventory tables, generic over the record type
#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

/// Append `WHERE (col ILIKE $n OR ...)` when a search term is present
fn push_search(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], search: Option<&str>) {
    let Some(term) = search else {
        return;
    };

    let pattern = format!("%{}%", term);
    builder.push(" WHERE (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        builder
            .push(*column)
            .push(" ILIKE ")
            .push_bind(pattern.clone());
    }
    builder.push(")");
}

impl InventoryRepository {
    /// Create a new inventory repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of records, most recently updated first
    pub async fn list<R: InventoryRecord>(
        &self,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<R>, i64)> {
        let limit = i64::from(per_page.max(1));
        let offset = i64::from(page.max(1) - 1) * limit;

        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", R::TABLE));
        push_search(&mut builder, R::SEARCH_COLUMNS, search);
        builder
            .push(" ORDER BY atualizado_em DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let items = builder
            .build_query_as::<R>()
            .fetch_all(&self.pool)
            .await?;

        let total = self.count::<R>(search).await?;

        Ok((items, total))
    }

    /// Every matching record, for exports
    pub async fn list_all<R: InventoryRecord>(&self, search: Option<&str>) -> Result<Vec<R>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", R::TABLE));
        push_search(&mut builder, R::SEARCH_COLUMNS, search);
        builder.push(" ORDER BY atualizado_em DESC, id DESC");

        let items = builder
            .build_query_as::<R>()
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Number of matching records
    pub async fn count<R: InventoryRecord>(&self, search: Option<&str>) -> Result<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", R::TABLE));
        push_search(&mut builder, R::SEARCH_COLUMNS, search);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Stored status of every matching record
    pub async fn statuses<R: InventoryRecord>(&self, search: Option<&str>) -> Result<Vec<String>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT situacao FROM {}", R::TABLE));
        push_search(&mut builder, R::SEARCH_COLUMNS, search);

        let statuses = builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;

        Ok(statuses)
    }

    /// Get a record by ID
    pub async fn get<R: InventoryRecord>(&self, id: i64) -> Result<Option<R>> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", R::TABLE);

        let item = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Insert a record
    pub async fn insert<R: InventoryRecord>(&self, fields: Fields) -> Result<R> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (", R::TABLE));

        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        builder.push(columns.join(", ")).push(") VALUES (");

        for (i, (_, value)) in fields.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            value.push_bind(&mut builder);
        }
        builder.push(") RETURNING *");

        let item = builder
            .build_query_as::<R>()
            .fetch_one(&self.pool)
            .await?;

        Ok(item)
    }

    /// Update a record and refresh its modification time
    pub async fn update<R: InventoryRecord>(&self, id: i64, fields: Fields) -> Result<Option<R>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", R::TABLE));

        for (column, value) in fields {
            builder.push(column).push(" = ");
            value.push_bind(&mut builder);
            builder.push(", ");
        }
        builder
            .push("atualizado_em = NOW() WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *");

        let item = builder
            .build_query_as::<R>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Delete a record
    pub async fn delete<R: InventoryRecord>(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_clause_binds_every_column() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM cl7");
        push_search(&mut builder, &["material", "marca"], Some("radio"));
        assert_eq!(
            builder.sql(),
            "SELECT * FROM cl7 WHERE (material ILIKE $1 OR marca ILIKE $2)"
        );
    }

    #[test]
    fn test_no_search_leaves_query_untouched() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM cl2");
        push_search(&mut builder, &["nome"], None);
        assert_eq!(builder.sql(), "SELECT * FROM cl2");
    }
}
