use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{Product, ProductStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    ActiveProductsQuery, CommitPlan, Mutation, MutationKind, OutboxEvent, OutboxReader,
    OutboxRepository, PlanApplier, ProductPage, ProductReadModel, ProductRecord,
    ProductRepository, Result, StoreError, Value,
    outbox::{EventId, OutboxStatus},
    schema::{outbox_events, products},
};

type Row = BTreeMap<&'static str, Value>;

/// Rows of one table in insertion order.
#[derive(Debug, Clone, Default)]
struct Table {
    rows: Vec<Row>,
}

impl Table {
    fn position(&self, key_column: &str, key: &Value) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.get(key_column) == Some(key))
    }
}

type Tables = HashMap<&'static str, Table>;

/// In-memory catalog store for tests and database-less runs.
///
/// Implements every storage contract over the same tables the Postgres store
/// uses. A plan is applied to a copy of the tables, which replaces the live
/// tables only if every mutation succeeded.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    applies: Arc<AtomicUsize>,
    fail_next_apply: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-empty plans that reached the store, failed or not.
    pub fn apply_count(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    /// Makes the next non-empty apply fail with `StoreError::Unavailable`
    /// without writing anything.
    pub fn fail_next_apply(&self) {
        self.fail_next_apply.store(true, Ordering::SeqCst);
    }

    /// Returns the number of rows in `table`.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map_or(0, |t| t.rows.len())
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        self.tables.write().await.clear();
    }

    async fn product_record(&self, id: AggregateId) -> Result<ProductRecord> {
        let tables = self.tables.read().await;
        let key = Value::uuid(id.as_uuid());
        let row = tables
            .get(products::TABLE)
            .and_then(|table| {
                table
                    .position(products::PRODUCT_ID, &key)
                    .map(|i| &table.rows[i])
            })
            .ok_or(StoreError::NotFound(id))?;
        record_from_row(row)
    }
}

fn apply_mutation(tables: &mut Tables, mutation: Mutation) -> Result<()> {
    let table_name = mutation.table();
    let kind = mutation.kind();
    let mut columns = mutation.into_columns().into_iter();
    let Some((key_column, key)) = columns.next() else {
        return Err(StoreError::Conflict(format!(
            "mutation on {table_name} has no key"
        )));
    };

    let table = tables.entry(table_name).or_default();
    match (kind, table.position(key_column, &key)) {
        (MutationKind::Insert, Some(_)) => Err(StoreError::Conflict(format!(
            "{table_name}: duplicate {key_column} {key:?}"
        ))),
        (MutationKind::Insert, None) => {
            let mut row = Row::new();
            row.insert(key_column, key);
            row.extend(columns);
            table.rows.push(row);
            Ok(())
        }
        (MutationKind::Update, None) => Err(StoreError::Conflict(format!(
            "{table_name}: no row with {key_column} {key:?}"
        ))),
        (MutationKind::Update, Some(i)) => {
            table.rows[i].extend(columns);
            Ok(())
        }
    }
}

fn column<'a>(row: &'a Row, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| StoreError::CorruptRow(format!("missing column {name}")))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| StoreError::CorruptRow(format!("null or mistyped column {name}")))
}

fn text(row: &Row, name: &str) -> Result<String> {
    required(column(row, name)?.as_text(), name).map(str::to_string)
}

fn int(row: &Row, name: &str) -> Result<i64> {
    required(column(row, name)?.as_int(), name)
}

fn uuid(row: &Row, name: &str) -> Result<Uuid> {
    required(column(row, name)?.as_uuid(), name)
}

fn timestamp(row: &Row, name: &str) -> Result<DateTime<Utc>> {
    required(column(row, name)?.as_timestamp(), name)
}

fn record_from_row(row: &Row) -> Result<ProductRecord> {
    let status = text(row, products::STATUS)?;
    Ok(ProductRecord {
        id: AggregateId::from_uuid(uuid(row, products::PRODUCT_ID)?),
        name: text(row, products::NAME)?,
        description: text(row, products::DESCRIPTION)?,
        category: text(row, products::CATEGORY)?,
        base_price_numerator: int(row, products::BASE_PRICE_NUMERATOR)?,
        base_price_denominator: int(row, products::BASE_PRICE_DENOMINATOR)?,
        discount_percent_numerator: column(row, products::DISCOUNT_PERCENT_NUMERATOR)?.as_int(),
        discount_percent_denominator: column(row, products::DISCOUNT_PERCENT_DENOMINATOR)?
            .as_int(),
        discount_start_date: column(row, products::DISCOUNT_START_DATE)?.as_timestamp(),
        discount_end_date: column(row, products::DISCOUNT_END_DATE)?.as_timestamp(),
        status: status
            .parse::<ProductStatus>()
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?,
        created_at: timestamp(row, products::CREATED_AT)?,
        updated_at: timestamp(row, products::UPDATED_AT)?,
        archived_at: column(row, products::ARCHIVED_AT)?.as_timestamp(),
    })
}

fn outbox_from_row(row: &Row) -> Result<OutboxEvent> {
    let payload = required(
        column(row, outbox_events::PAYLOAD)?.as_json().cloned(),
        outbox_events::PAYLOAD,
    )?;
    let status = text(row, outbox_events::STATUS)?
        .parse::<OutboxStatus>()
        .map_err(StoreError::CorruptRow)?;

    let mut builder = OutboxEvent::builder()
        .event_id(EventId::from_uuid(uuid(row, outbox_events::EVENT_ID)?))
        .event_type(text(row, outbox_events::EVENT_TYPE)?)
        .aggregate_id(AggregateId::from_uuid(uuid(row, outbox_events::AGGREGATE_ID)?))
        .payload_raw(payload)
        .status(status);
    if let Some(processed_at) = column(row, outbox_events::PROCESSED_AT)?.as_timestamp() {
        builder = builder.processed_at(processed_at);
    }

    builder
        .try_build(timestamp(row, outbox_events::CREATED_AT)?)
        .ok_or_else(|| StoreError::CorruptRow("incomplete outbox row".to_string()))
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find_by_id(&self, id: AggregateId) -> Result<Product> {
        let record = self.product_record(id).await?;
        Ok(Product::rehydrate(record.into_state()?))
    }
}

impl OutboxRepository for InMemoryStore {}

#[async_trait]
impl OutboxReader for InMemoryStore {
    async fn events_for_aggregate(&self, aggregate_id: AggregateId) -> Result<Vec<OutboxEvent>> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(outbox_events::TABLE) else {
            return Ok(Vec::new());
        };

        let key = Value::uuid(aggregate_id.as_uuid());
        let mut events = table
            .rows
            .iter()
            .filter(|row| row.get(outbox_events::AGGREGATE_ID) == Some(&key))
            .map(outbox_from_row)
            .collect::<Result<Vec<_>>>()?;
        // Stable: rows written in one plan keep their plan order.
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }
}

#[async_trait]
impl PlanApplier for InMemoryStore {
    async fn apply(&self, plan: CommitPlan) -> Result<()> {
        if plan.is_empty() {
            return Ok(());
        }

        self.applies.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_apply.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected apply failure".to_string()));
        }

        let operations = plan.len();
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        for mutation in plan.into_operations() {
            apply_mutation(&mut staged, mutation)?;
        }
        *tables = staged;

        tracing::debug!(operations, "applied commit plan in memory");
        metrics::counter!("catalog_commits_applied_total").increment(1);
        metrics::counter!("catalog_commit_operations_total").increment(operations as u64);
        Ok(())
    }
}

#[async_trait]
impl ProductReadModel for InMemoryStore {
    async fn get_by_id(&self, id: AggregateId) -> Result<ProductRecord> {
        self.product_record(id).await
    }

    async fn list_active(&self, query: &ActiveProductsQuery) -> Result<ProductPage> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(products::TABLE) else {
            return Ok(ProductPage::default());
        };

        let active = Value::text(ProductStatus::Active.as_str());
        let category = query.category.as_deref().map(Value::text);
        let mut records = table
            .rows
            .iter()
            .filter(|row| row.get(products::STATUS) == Some(&active))
            .filter(|row| {
                category
                    .as_ref()
                    .is_none_or(|c| row.get(products::CATEGORY) == Some(c))
            })
            .map(record_from_row)
            .collect::<Result<Vec<_>>>()?;

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let items: Vec<_> = records
            .into_iter()
            .skip(query.offset())
            .take(query.limit())
            .collect();
        let next_page_token = query.next_page_token(items.len());

        Ok(ProductPage {
            items,
            next_page_token,
        })
    }
}
