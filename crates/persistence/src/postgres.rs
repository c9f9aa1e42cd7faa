//! Direct Postgres gateway.
//!
//! Rows travel as JSON: selects project each row with `to_jsonb`, writes go
//! through `jsonb_populate_record` so column types come from the table
//! definition. Table and column names are validated and quoted before they
//! are spliced into SQL; values are always bound.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use domain::services::{Filter, GatewayError, Query, Row, TableGateway};

use crate::metrics::GatewayTimer;
use crate::tables::{quoted, TableNames};

/// Table gateway over a Postgres pool.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
    tables: TableNames,
}

fn map_sqlx(e: sqlx::Error) -> GatewayError {
    match e {
        sqlx::Error::RowNotFound => GatewayError::NotFound("row".to_string()),
        sqlx::Error::Database(db) => GatewayError::Status {
            status: 400,
            message: db.message().to_string(),
        },
        sqlx::Error::ColumnDecode { source, .. } | sqlx::Error::Decode(source) => {
            GatewayError::Decode(source.to_string())
        }
        other => GatewayError::Transport(other.to_string()),
    }
}

fn into_row(value: Value) -> Result<Row, GatewayError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::Decode(format!("expected object row, got {}", other))),
    }
}

/// `WHERE` clause for `filters`, numbering placeholders from `first`.
fn where_clause(filters: &[Filter], first: usize) -> Result<String, GatewayError> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let conditions = filters
        .iter()
        .enumerate()
        .map(|(i, filter)| {
            let column = quoted(filter.column())?;
            Ok(format!("t.{}::text = ${}", column, first + i))
        })
        .collect::<Result<Vec<_>, GatewayError>>()?;
    Ok(format!(" WHERE {}", conditions.join(" AND ")))
}

fn filter_values(filters: &[Filter]) -> impl Iterator<Item = &str> {
    filters.iter().map(|filter| match filter {
        Filter::Eq(_, value) => value.as_str(),
    })
}

impl PgGateway {
    pub fn new(pool: PgPool, tables: TableNames) -> Self {
        Self { pool, tables }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(&self, logical: &str) -> Result<String, GatewayError> {
        quoted(&self.tables.physical(logical)?)
    }

    fn select_sql(&self, table: &str, query: &Query) -> Result<String, GatewayError> {
        let mut sql = format!(
            "SELECT to_jsonb(t) FROM {} AS t{}",
            self.table(table)?,
            where_clause(&query.filters, 1)?
        );
        if !query.order.is_empty() {
            let order = query
                .order
                .iter()
                .map(|o| {
                    Ok(format!(
                        "t.{} {}",
                        quoted(&o.column)?,
                        if o.ascending { "ASC" } else { "DESC" }
                    ))
                })
                .collect::<Result<Vec<_>, GatewayError>>()?;
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        Ok(sql)
    }

    fn insert_sql(&self, table: &str, row: &Row) -> Result<String, GatewayError> {
        let table = self.table(table)?;
        if row.is_empty() {
            return Ok(format!(
                "INSERT INTO {} AS r DEFAULT VALUES RETURNING to_jsonb(r.*)",
                table
            ));
        }
        let columns = row
            .keys()
            .map(|k| quoted(k))
            .collect::<Result<Vec<_>, GatewayError>>()?
            .join(", ");
        Ok(format!(
            "INSERT INTO {table} AS r ({columns}) \
             SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING to_jsonb(r.*)"
        ))
    }

    fn update_sql(&self, table: &str, patch: &Row) -> Result<String, GatewayError> {
        let table = self.table(table)?;
        if patch.is_empty() {
            return Ok(format!(
                "SELECT to_jsonb(r) FROM {} AS r WHERE r.id::text = $2 AND $1::jsonb IS NOT NULL",
                table
            ));
        }
        let assignments = patch
            .keys()
            .map(|k| {
                let column = quoted(k)?;
                Ok(format!("{column} = p.{column}"))
            })
            .collect::<Result<Vec<_>, GatewayError>>()?
            .join(", ");
        Ok(format!(
            "UPDATE {table} AS r SET {assignments} \
             FROM jsonb_populate_record(NULL::{table}, $1) AS p \
             WHERE r.id::text = $2 \
             RETURNING to_jsonb(r.*)"
        ))
    }
}

#[async_trait]
impl TableGateway for PgGateway {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let sql = self.select_sql(table, query)?;
        let timer = GatewayTimer::new("select", table);

        let mut statement = sqlx::query_scalar::<_, Value>(&sql);
        for value in filter_values(&query.filters) {
            statement = statement.bind(value);
        }
        let result = statement.fetch_all(&self.pool).await.map_err(map_sqlx);
        timer.finish(result.is_ok());

        result?.into_iter().map(into_row).collect()
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, GatewayError> {
        let sql = self.insert_sql(table, &row)?;
        let timer = GatewayTimer::new("insert", table);

        let result = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Json(Value::Object(row)))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx);
        timer.finish(result.is_ok());

        into_row(result?)
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> Result<Row, GatewayError> {
        let sql = self.update_sql(table, &patch)?;
        let timer = GatewayTimer::new("update", table);

        let result = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Json(Value::Object(patch)))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx);
        timer.finish(result.is_ok());

        match result? {
            Some(value) => into_row(value),
            None => Err(GatewayError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), GatewayError> {
        let sql = format!("DELETE FROM {} WHERE id::text = $1", self.table(table)?);
        let timer = GatewayTimer::new("delete", table);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx);
        timer.finish(result.is_ok());

        result.map(|_| ())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, GatewayError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} AS t{}",
            self.table(table)?,
            where_clause(filters, 1)?
        );
        let timer = GatewayTimer::new("count", table);

        let mut statement = sqlx::query_scalar::<_, i64>(&sql);
        for value in filter_values(filters) {
            statement = statement.bind(value);
        }
        let result = statement.fetch_one(&self.pool).await.map_err(map_sqlx);
        timer.finish(result.is_ok());

        Ok(result?.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::OrderBy;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    fn gateway() -> PgGateway {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/green_life_expo_test")
            .unwrap();
        PgGateway::new(pool, TableNames::new("_20251225"))
    }

    fn row(value: Value) -> Row {
        into_row(value).unwrap()
    }

    #[tokio::test]
    async fn test_select_sql() {
        let query = Query::new()
            .filter(Filter::eq("category", "seo"))
            .order(OrderBy::asc("setting_key"))
            .order(OrderBy::desc("created_at"));
        let sql = gateway().select_sql("site_settings", &query).unwrap();
        assert_eq!(
            sql,
            "SELECT to_jsonb(t) FROM \"site_settings_20251225\" AS t \
             WHERE t.\"category\"::text = $1 \
             ORDER BY t.\"setting_key\" ASC, t.\"created_at\" DESC"
        );
    }

    #[tokio::test]
    async fn test_insert_sql() {
        let sql = gateway()
            .insert_sql("faqs", &row(json!({"answer": "a", "question": "q"})))
            .unwrap();
        assert!(sql.starts_with("INSERT INTO \"faqs_20251225\" AS r (\"answer\", \"question\")"));
        assert!(sql.contains("jsonb_populate_record(NULL::\"faqs_20251225\", $1)"));
    }

    #[tokio::test]
    async fn test_update_sql() {
        let sql = gateway()
            .update_sql("packages", &row(json!({"name": "Gold", "updated_at": "now"})))
            .unwrap();
        assert!(sql.contains("SET \"name\" = p.\"name\", \"updated_at\" = p.\"updated_at\""));
        assert!(sql.contains("WHERE r.id::text = $2"));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_column() {
        let err = gateway()
            .update_sql("packages", &row(json!({"name\"; drop": 1})))
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidIdentifier(_)));

        let query = Query::new().order(OrderBy::asc("Name"));
        assert!(gateway().select_sql("packages", &query).is_err());
    }

    #[test]
    fn test_where_clause_numbering() {
        let filters = [Filter::eq("a", "1"), Filter::eq("b", "2")];
        assert_eq!(
            where_clause(&filters, 1).unwrap(),
            " WHERE t.\"a\"::text = $1 AND t.\"b\"::text = $2"
        );
        assert_eq!(where_clause(&[], 1).unwrap(), "");
    }
}
