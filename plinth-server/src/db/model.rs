//! Generic CRUD over arbitrary tables.
//!
//! `Model<T>` issues parameterized SQL against the table described by `T`.
//! The `*_data` methods are a deliberately soft surface: any failure is
//! logged and collapsed into a sentinel (`None`), for handlers that prefer
//! an empty result over a propagated error. Callers that need the error
//! use the `try_*` methods.

use std::marker::PhantomData;

use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres, Row};

use plinth_core::filter::{where_clause, Filter, Record, SqlValue};
use plinth_core::pagination::{Page, Paginated};
use plinth_core::validation::{validate_identifier, IdentifierError};

/// Static description of a database table.
pub trait Table {
    /// Table name, validated before SQL assembly.
    const NAME: &'static str;

    /// Column for the default descending sort on list queries.
    const ORDER_COLUMN: &'static str = "id";

    /// Row type returned by queries.
    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin;
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("empty record: at least one column is required")]
    EmptyRecord,
}

/// Generic repository over a single table.
pub struct Model<T: Table> {
    pool: PgPool,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: Table> Model<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    /// Insert a row built from `record`, returning it.
    pub async fn try_add(&self, record: &Record) -> Result<T::Row, DbError> {
        let sql = insert_statement(T::NAME, record)?;
        let mut query = sqlx::query_as::<_, T::Row>(&sql);
        for value in record.values() {
            query = bind_value_as(query, value);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    /// List matching rows, newest first, with the total count.
    pub async fn try_query(
        &self,
        filters: &[Filter],
        page: Page,
    ) -> Result<Paginated<T::Row>, DbError> {
        let (sql, binds) = select_statement(T::NAME, T::ORDER_COLUMN, filters)?;
        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value);
        }
        query = query.bind(page.limit() as i64).bind(page.offset() as i64);

        let rows = query.fetch_all(&self.pool).await?;
        // COUNT(*) OVER() rides along on the returned rows, so a page past
        // the last row comes back empty and carries no total; recount.
        let total = match rows.first() {
            Some(row) => row.get::<i64, _>("__total"),
            None if page.offset() > 0 => self.count(filters).await?,
            None => 0,
        };
        let items = rows
            .iter()
            .map(T::Row::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    /// Total number of matching rows.
    async fn count(&self, filters: &[Filter]) -> Result<i64, DbError> {
        let (sql, binds) = count_statement(T::NAME, filters)?;
        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value);
        }
        Ok(query.fetch_one(&self.pool).await?.get::<i64, _>(0))
    }

    /// First matching row, if any. A missing row is `Ok(None)`.
    pub async fn try_query_one(&self, filters: &[Filter]) -> Result<Option<T::Row>, DbError> {
        let (sql, binds) = select_one_statement(T::NAME, filters)?;
        let mut query = sqlx::query_as::<_, T::Row>(&sql);
        for value in &binds {
            query = bind_value_as(query, value);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    /// Update matching rows, returning the affected count.
    pub async fn try_update(&self, filters: &[Filter], record: &Record) -> Result<u64, DbError> {
        let (sql, binds) = update_statement(T::NAME, record, filters)?;
        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value);
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    /// Delete matching rows, returning the affected count.
    pub async fn try_delete(&self, filters: &[Filter]) -> Result<u64, DbError> {
        let (sql, binds) = delete_statement(T::NAME, filters)?;
        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = bind_value(query, value);
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    /// Soft insert: the created row, or `None` on any failure (logged).
    pub async fn add_data(&self, record: Record) -> Option<T::Row> {
        match self.try_add(&record).await {
            Ok(row) => Some(row),
            Err(err) => {
                tracing::error!(table = T::NAME, %err, "add_data failed");
                None
            }
        }
    }

    /// Soft list: one page of rows, or `None` on any failure (logged).
    pub async fn query_data(&self, filters: &[Filter], page: Page) -> Option<Paginated<T::Row>> {
        match self.try_query(filters, page).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(table = T::NAME, %err, "query_data failed");
                None
            }
        }
    }

    /// Soft point read: the first match; `None` covers both a missing row
    /// and a failure (logged).
    pub async fn query_one_data(&self, filters: &[Filter]) -> Option<T::Row> {
        match self.try_query_one(filters).await {
            Ok(row) => row,
            Err(err) => {
                tracing::error!(table = T::NAME, %err, "query_one_data failed");
                None
            }
        }
    }

    /// Soft update: affected row count, or `None` on any failure (logged).
    pub async fn update_data(&self, filters: &[Filter], record: Record) -> Option<u64> {
        match self.try_update(filters, &record).await {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::error!(table = T::NAME, %err, "update_data failed");
                None
            }
        }
    }

    /// Soft delete: affected row count, or `None` on any failure (logged).
    pub async fn delete_data(&self, filters: &[Filter]) -> Option<u64> {
        match self.try_delete(filters).await {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::error!(table = T::NAME, %err, "delete_data failed");
                None
            }
        }
    }
}

/// SQL NULL is bound as a text null; typed columns should use IS NULL
/// filters instead of binding null values.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Uuid(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
    }
}

fn bind_value_as<'q, R>(
    query: QueryAs<'q, Postgres, R, PgArguments>,
    value: &SqlValue,
) -> QueryAs<'q, Postgres, R, PgArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Uuid(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
    }
}

fn insert_statement(table: &str, record: &Record) -> Result<String, DbError> {
    let table = validate_identifier(table)?;
    if record.is_empty() {
        return Err(DbError::EmptyRecord);
    }

    let mut columns = Vec::with_capacity(record.len());
    let mut placeholders = Vec::with_capacity(record.len());
    for (i, (column, _)) in record.entries().iter().enumerate() {
        columns.push(validate_identifier(column)?);
        placeholders.push(format!("${}", i + 1));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

fn select_statement(
    table: &str,
    order_column: &str,
    filters: &[Filter],
) -> Result<(String, Vec<SqlValue>), DbError> {
    let table = validate_identifier(table)?;
    let order = validate_identifier(order_column)?;
    let (where_sql, binds) = where_clause(filters, 1)?;

    // COUNT(*) OVER() gives the total in the same query
    let sql = format!(
        "SELECT *, COUNT(*) OVER() AS __total FROM {}{} ORDER BY {} DESC LIMIT ${} OFFSET ${}",
        table,
        where_sql,
        order,
        binds.len() + 1,
        binds.len() + 2
    );
    Ok((sql, binds))
}

fn count_statement(table: &str, filters: &[Filter]) -> Result<(String, Vec<SqlValue>), DbError> {
    let table = validate_identifier(table)?;
    let (where_sql, binds) = where_clause(filters, 1)?;
    Ok((format!("SELECT COUNT(*) FROM {}{}", table, where_sql), binds))
}

fn select_one_statement(table: &str, filters: &[Filter]) -> Result<(String, Vec<SqlValue>), DbError> {
    let table = validate_identifier(table)?;
    let (where_sql, binds) = where_clause(filters, 1)?;
    Ok((format!("SELECT * FROM {}{} LIMIT 1", table, where_sql), binds))
}

fn update_statement(
    table: &str,
    record: &Record,
    filters: &[Filter],
) -> Result<(String, Vec<SqlValue>), DbError> {
    let table = validate_identifier(table)?;
    if record.is_empty() {
        return Err(DbError::EmptyRecord);
    }

    let mut sql = format!("UPDATE {} SET ", table);
    let mut binds: Vec<SqlValue> = Vec::with_capacity(record.len() + filters.len());
    for (i, (column, value)) in record.entries().iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(validate_identifier(column)?);
        sql.push_str(&format!(" = ${}", i + 1));
        binds.push(value.clone());
    }

    let (where_sql, where_binds) = where_clause(filters, binds.len() + 1)?;
    sql.push_str(&where_sql);
    binds.extend(where_binds);

    Ok((sql, binds))
}

fn delete_statement(table: &str, filters: &[Filter]) -> Result<(String, Vec<SqlValue>), DbError> {
    let table = validate_identifier(table)?;
    let (where_sql, binds) = where_clause(filters, 1)?;
    Ok((format!("DELETE FROM {}{}", table, where_sql), binds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, sqlx::FromRow, serde::Serialize)]
    struct Gadget {
        id: i64,
        name: String,
        quantity: i64,
    }

    struct Gadgets;

    impl Table for Gadgets {
        const NAME: &'static str = "plinth_test_gadgets";
        type Row = Gadget;
    }

    #[test]
    fn insert_statement_shape() {
        let record = Record::new().set("name", "widget").set("quantity", 3_i64);
        let sql = insert_statement("gadgets", &record).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO gadgets (name, quantity) VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn insert_rejects_empty_record() {
        assert!(matches!(
            insert_statement("gadgets", &Record::new()),
            Err(DbError::EmptyRecord)
        ));
    }

    #[test]
    fn select_numbers_limit_after_filters() {
        let filters = [Filter::eq("name", "widget"), Filter::gt("quantity", 1_i64)];
        let (sql, binds) = select_statement("gadgets", "id", &filters).unwrap();
        assert_eq!(
            sql,
            "SELECT *, COUNT(*) OVER() AS __total FROM gadgets \
             WHERE name = $1 AND quantity > $2 ORDER BY id DESC LIMIT $3 OFFSET $4"
        );
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn select_without_filters() {
        let (sql, binds) = select_statement("gadgets", "id", &[]).unwrap();
        assert_eq!(
            sql,
            "SELECT *, COUNT(*) OVER() AS __total FROM gadgets ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn select_one_has_no_ordering() {
        let filters = [Filter::eq("id", 5_i64)];
        let (sql, _) = select_one_statement("gadgets", &filters).unwrap();
        assert_eq!(sql, "SELECT * FROM gadgets WHERE id = $1 LIMIT 1");
    }

    #[test]
    fn count_statement_shape() {
        let filters = [Filter::eq("name", "widget")];
        let (sql, binds) = count_statement("gadgets", &filters).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM gadgets WHERE name = $1");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn update_places_where_after_set() {
        let record = Record::from_json(&json!({"name": "sprocket"})).unwrap();
        let filters = [Filter::eq("id", 9_i64)];
        let (sql, binds) = update_statement("gadgets", &record, &filters).unwrap();
        assert_eq!(sql, "UPDATE gadgets SET name = $1 WHERE id = $2");
        assert_eq!(binds.len(), 2);
        assert_eq!(binds[0], SqlValue::Text("sprocket".into()));
        assert_eq!(binds[1], SqlValue::Int(9));
    }

    #[test]
    fn delete_statement_shape() {
        let filters = [Filter::eq("id", 4_i64)];
        let (sql, binds) = delete_statement("gadgets", &filters).unwrap();
        assert_eq!(sql, "DELETE FROM gadgets WHERE id = $1");
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn hostile_table_name_is_rejected() {
        struct Hostile;
        impl Table for Hostile {
            const NAME: &'static str = "gadgets; DROP TABLE gadgets";
            type Row = Gadget;
        }
        let record = Record::new().set("name", "x");
        assert!(insert_statement(Hostile::NAME, &record).is_err());
    }

    // Integration tests - run with DATABASE_URL set
    // cargo test -p plinth-server -- --ignored

    async fn test_pool() -> sqlx::PgPool {
        let config = crate::config::ServerConfig {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL required"),
            ..Default::default()
        };
        config.connect_pool().await.expect("pool")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn crud_round_trip() {
        let pool = test_pool().await;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS plinth_test_gadgets (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                quantity BIGINT NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .expect("create table");

        let model = Model::<Gadgets>::new(pool.clone());

        let created = model
            .add_data(Record::new().set("name", "widget").set("quantity", 2_i64))
            .await
            .expect("insert should succeed");
        assert_eq!(created.name, "widget");

        let filters = [Filter::eq("id", created.id)];
        let fetched = model.query_one_data(&filters).await.expect("row exists");
        assert_eq!(fetched.quantity, 2);

        let updated = model
            .update_data(&filters, Record::new().set("quantity", 5_i64))
            .await;
        assert_eq!(updated, Some(1));

        let listed = model
            .query_data(&[Filter::eq("name", "widget")], Page::default())
            .await
            .expect("list should succeed");
        assert!(listed.total >= 1);

        let deleted = model.delete_data(&filters).await;
        assert_eq!(deleted, Some(1));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_past_last_page_still_reports_total() {
        let pool = test_pool().await;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS plinth_test_gadgets (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                quantity BIGINT NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .expect("create table");

        let model = Model::<Gadgets>::new(pool);
        let filters = [Filter::eq("name", "paged-gadget")];
        model.delete_data(&filters).await;

        for i in 0..3_i64 {
            model
                .add_data(Record::new().set("name", "paged-gadget").set("quantity", i))
                .await
                .expect("insert should succeed");
        }

        let listed = model
            .query_data(&filters, Page::new(5, 10))
            .await
            .expect("list should succeed");
        assert!(listed.items.is_empty());
        assert_eq!(listed.total, 3);
        assert_eq!(listed.total_pages(), 1);

        model.delete_data(&filters).await;
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_table_is_swallowed() {
        struct Missing;
        impl Table for Missing {
            const NAME: &'static str = "plinth_no_such_table";
            type Row = Gadget;
        }

        let pool = test_pool().await;
        let model = Model::<Missing>::new(pool);

        assert!(model.query_data(&[], Page::default()).await.is_none());
        assert!(model.query_one_data(&[]).await.is_none());
        assert_eq!(model.delete_data(&[]).await, None);
    }
}
