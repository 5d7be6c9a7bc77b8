use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Product, ProductStatus};
use sqlx::{
    PgConnection, PgPool, Postgres, Row,
    postgres::{PgArguments, PgRow},
    query::Query,
};
use uuid::Uuid;

use crate::{
    ActiveProductsQuery, CommitPlan, Mutation, MutationKind, OutboxEvent, OutboxReader,
    OutboxRepository, PlanApplier, ProductPage, ProductReadModel, ProductRecord,
    ProductRepository, Result, StoreError, Value,
    outbox::{EventId, OutboxStatus},
    schema::{outbox_events, products},
};

const PRODUCT_COLUMNS: &str = "product_id, name, description, category, \
    base_price_numerator, base_price_denominator, \
    discount_percent_numerator, discount_percent_denominator, \
    discount_start_date, discount_end_date, \
    status, created_at, updated_at, archived_at";

/// PostgreSQL-backed catalog store.
///
/// Each plan runs in its own transaction; reads go straight to the pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn product_record(&self, id: AggregateId) -> Result<ProductRecord> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        row_to_record(&row)
    }
}

fn row_to_record(row: &PgRow) -> Result<ProductRecord> {
    let status: String = row.try_get(products::STATUS)?;

    Ok(ProductRecord {
        id: AggregateId::from_uuid(row.try_get::<Uuid, _>(products::PRODUCT_ID)?),
        name: row.try_get(products::NAME)?,
        description: row.try_get(products::DESCRIPTION)?,
        category: row.try_get(products::CATEGORY)?,
        base_price_numerator: row.try_get(products::BASE_PRICE_NUMERATOR)?,
        base_price_denominator: row.try_get(products::BASE_PRICE_DENOMINATOR)?,
        discount_percent_numerator: row.try_get(products::DISCOUNT_PERCENT_NUMERATOR)?,
        discount_percent_denominator: row.try_get(products::DISCOUNT_PERCENT_DENOMINATOR)?,
        discount_start_date: row.try_get(products::DISCOUNT_START_DATE)?,
        discount_end_date: row.try_get(products::DISCOUNT_END_DATE)?,
        status: status
            .parse::<ProductStatus>()
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?,
        created_at: row.try_get(products::CREATED_AT)?,
        updated_at: row.try_get(products::UPDATED_AT)?,
        archived_at: row.try_get(products::ARCHIVED_AT)?,
    })
}

fn row_to_outbox(row: &PgRow) -> Result<OutboxEvent> {
    let status: String = row.try_get(outbox_events::STATUS)?;
    let status = status
        .parse::<OutboxStatus>()
        .map_err(StoreError::CorruptRow)?;

    let mut builder = OutboxEvent::builder()
        .event_id(EventId::from_uuid(row.try_get(outbox_events::EVENT_ID)?))
        .event_type(row.try_get::<String, _>(outbox_events::EVENT_TYPE)?)
        .aggregate_id(AggregateId::from_uuid(
            row.try_get(outbox_events::AGGREGATE_ID)?,
        ))
        .payload_raw(row.try_get(outbox_events::PAYLOAD)?)
        .status(status);
    if let Some(processed_at) =
        row.try_get::<Option<DateTime<Utc>>, _>(outbox_events::PROCESSED_AT)?
    {
        builder = builder.processed_at(processed_at);
    }

    builder
        .try_build(row.try_get(outbox_events::CREATED_AT)?)
        .ok_or_else(|| StoreError::CorruptRow("incomplete outbox row".to_string()))
}

fn bind_value(
    query: Query<'_, Postgres, PgArguments>,
    value: Value,
) -> Query<'_, Postgres, PgArguments> {
    match value {
        Value::Text(v) => query.bind(v),
        Value::Int(v) => query.bind(v),
        Value::Uuid(v) => query.bind(v),
        Value::Timestamp(v) => query.bind(v),
        Value::Json(v) => query.bind(v),
    }
}

/// Renders the statement for a mutation. Parameters are numbered in column
/// order, so `$1` is always the key.
fn mutation_sql(
    table: &str,
    kind: MutationKind,
    columns: &[(&'static str, Value)],
) -> Result<String> {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    match kind {
        MutationKind::Insert => {
            let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("${i}")).collect();
            Ok(format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                names.join(", "),
                placeholders.join(", ")
            ))
        }
        MutationKind::Update => {
            let Some((key, rest)) = names.split_first() else {
                return Err(StoreError::Conflict(format!("update of {table} has no key")));
            };
            if rest.is_empty() {
                return Err(StoreError::Conflict(format!(
                    "update of {table} sets no columns"
                )));
            }
            let assignments: Vec<String> = rest
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{name} = ${}", i + 2))
                .collect();
            Ok(format!(
                "UPDATE {table} SET {} WHERE {key} = $1",
                assignments.join(", ")
            ))
        }
    }
}

async fn execute_mutation(conn: &mut PgConnection, mutation: Mutation) -> Result<()> {
    let table = mutation.table();
    let kind = mutation.kind();
    let columns = mutation.into_columns();
    let sql = mutation_sql(table, kind, &columns)?;

    let mut query = sqlx::query(&sql);
    for (_, value) in columns {
        query = bind_value(query, value);
    }

    let result = query.execute(&mut *conn).await.map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return StoreError::Conflict(format!("{table}: {}", db_err.message()));
        }
        StoreError::Database(e)
    })?;

    if kind == MutationKind::Update && result.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!("{table}: no row to update")));
    }
    Ok(())
}

#[async_trait]
impl ProductRepository for PostgresStore {
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    async fn find_by_id(&self, id: AggregateId) -> Result<Product> {
        let record = self.product_record(id).await?;
        Ok(Product::rehydrate(record.into_state()?))
    }
}

impl OutboxRepository for PostgresStore {}

#[async_trait]
impl OutboxReader for PostgresStore {
    async fn events_for_aggregate(&self, aggregate_id: AggregateId) -> Result<Vec<OutboxEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT event_id, event_type, aggregate_id, payload, status, created_at, processed_at
            FROM outbox_events
            WHERE aggregate_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(aggregate_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_outbox).collect()
    }
}

#[async_trait]
impl PlanApplier for PostgresStore {
    #[tracing::instrument(skip_all, fields(operations = plan.len()))]
    async fn apply(&self, plan: CommitPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        let operations = plan.len();
        let mut tx = self.pool.begin().await?;
        for mutation in plan.into_operations() {
            // Dropping the transaction on error rolls it back.
            execute_mutation(&mut tx, mutation).await?;
        }
        tx.commit().await?;

        metrics::counter!("catalog_commits_applied_total").increment(1);
        metrics::counter!("catalog_commit_operations_total").increment(operations as u64);
        Ok(())
    }
}

#[async_trait]
impl ProductReadModel for PostgresStore {
    async fn get_by_id(&self, id: AggregateId) -> Result<ProductRecord> {
        self.product_record(id).await
    }

    async fn list_active(&self, query: &ActiveProductsQuery) -> Result<ProductPage> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE status = $1");
        let mut param_count = 1;

        if query.category.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND category = ${param_count}"));
        }
        sql.push_str(&format!(
            " ORDER BY created_at DESC, product_id ASC LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        ));

        let mut sqlx_query = sqlx::query(&sql).bind(ProductStatus::Active.as_str());
        if let Some(category) = &query.category {
            sqlx_query = sqlx_query.bind(category);
        }
        let limit = i64::try_from(query.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset()).unwrap_or(0);
        sqlx_query = sqlx_query.bind(limit).bind(offset);

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        let items = rows.iter().map(row_to_record).collect::<Result<Vec<_>>>()?;
        let next_page_token = query.next_page_token(items.len());

        Ok(ProductPage {
            items,
            next_page_token,
        })
    }
}
