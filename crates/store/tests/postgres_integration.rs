//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency and run
//! serially because each one truncates the tables. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::{AggregateRoot, Discount, Money, Product, ProductStatus};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    ActiveProductsQuery, AggregateId, CommitPlan, OutboxReader, OutboxRepository, OutboxStatus,
    PlanApplier, PostgresStore, ProductReadModel, ProductRepository, StoreError,
    build_outbox_events,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products, outbox_events")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap()
}

fn new_product(category: &str, at: DateTime<Utc>) -> Product {
    Product::create(
        AggregateId::new(),
        "Desk Lamp",
        "LED",
        category,
        Money::new(1999, 100).unwrap(),
        at,
    )
    .unwrap()
}

/// Inserts the product with its pending events and clears its tracker.
async fn save_new(store: &PostgresStore, product: &mut Product, at: DateTime<Utc>) {
    let mut plan = CommitPlan::new();
    plan.add(store.insert_op(product).unwrap());
    for event in build_outbox_events(&product.pull_pending_events(), at).unwrap() {
        plan.add(store.insert_event_op(&event));
    }
    store.apply(plan).await.unwrap();
    product.mark_persisted();
}

async fn save_changes(store: &PostgresStore, product: &mut Product, at: DateTime<Utc>) {
    let mut plan = CommitPlan::new();
    if let Some(op) = store.update_op(product).unwrap() {
        plan.add(op);
    }
    for event in build_outbox_events(&product.pull_pending_events(), at).unwrap() {
        plan.add(store.insert_event_op(&event));
    }
    store.apply(plan).await.unwrap();
    product.mark_persisted();
}

#[tokio::test]
#[serial]
async fn insert_and_load_product() {
    let store = get_test_store().await;
    let mut product = new_product("lighting", t0());
    save_new(&store, &mut product, t0()).await;

    let loaded = store.find_by_id(product.id()).await.unwrap();
    assert_eq!(loaded.name(), "Desk Lamp");
    assert_eq!(loaded.base_price().to_string(), "19.99");
    assert_eq!(loaded.status(), ProductStatus::Inactive);
    assert_eq!(loaded.created_at(), t0());
    assert!(loaded.pending_events().is_empty());

    let events = store.events_for_aggregate(product.id()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "product.created");
    assert_eq!(events[0].status, OutboxStatus::Pending);
    assert_eq!(events[0].payload["event_type"], "product.created");
}

#[tokio::test]
#[serial]
async fn missing_product_is_not_found() {
    let store = get_test_store().await;
    let result = store.find_by_id(AggregateId::new()).await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[tokio::test]
#[serial]
async fn discount_round_trips_exactly() {
    let store = get_test_store().await;
    let mut product = new_product("lighting", t0());
    save_new(&store, &mut product, t0()).await;

    let at = t0() + Duration::minutes(1);
    product.activate(at).unwrap();
    let percent = Discount::parse_percentage("12.5").unwrap();
    let discount = Discount::new(percent, at, at + Duration::days(3)).unwrap();
    product.apply_discount(discount.clone(), at).unwrap();
    save_changes(&store, &mut product, at).await;

    let loaded = store.find_by_id(product.id()).await.unwrap();
    assert_eq!(loaded.status(), ProductStatus::Active);
    assert_eq!(loaded.discount(), Some(&discount));
    assert_eq!(loaded.updated_at(), at);

    let record = store.get_by_id(product.id()).await.unwrap();
    assert_eq!(record.discount_percent_numerator, Some(25));
    assert_eq!(record.discount_percent_denominator, Some(2));

    let types: Vec<_> = store
        .events_for_aggregate(product.id())
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "product.created",
            "product.activated",
            "product.discount_applied"
        ]
    );
}

#[tokio::test]
#[serial]
async fn removing_discount_clears_columns() {
    let store = get_test_store().await;
    let mut product = new_product("lighting", t0());
    product.activate(t0()).unwrap();
    let percent = Discount::parse_percentage("10").unwrap();
    product
        .apply_discount(Discount::new(percent, t0(), t0() + Duration::days(1)).unwrap(), t0())
        .unwrap();
    save_new(&store, &mut product, t0()).await;

    product.remove_discount(t0() + Duration::hours(1)).unwrap();
    save_changes(&store, &mut product, t0() + Duration::hours(1)).await;

    let record = store.get_by_id(product.id()).await.unwrap();
    assert_eq!(record.discount_percent_numerator, None);
    assert_eq!(record.discount_end_date, None);
}

#[tokio::test]
#[serial]
async fn failed_plan_leaves_nothing_behind() {
    let store = get_test_store().await;
    let mut existing = new_product("lighting", t0());
    save_new(&store, &mut existing, t0()).await;

    let mut fresh = new_product("lighting", t0());
    let mut plan = CommitPlan::new();
    plan.add(store.insert_op(&fresh).unwrap());
    for event in build_outbox_events(&fresh.pull_pending_events(), t0()).unwrap() {
        plan.add(store.insert_event_op(&event));
    }
    plan.add(store.insert_op(&existing).unwrap());

    let result = store.apply(plan).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert!(matches!(
        store.find_by_id(fresh.id()).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(store.events_for_aggregate(fresh.id()).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn empty_plan_is_a_noop() {
    let store = get_test_store().await;
    store.apply(CommitPlan::new()).await.unwrap();
}

#[tokio::test]
#[serial]
async fn list_active_pages_newest_first() {
    let store = get_test_store().await;

    let mut ids = Vec::new();
    for hour in 0..3 {
        let at = t0() + Duration::hours(hour);
        let mut product = new_product("lighting", at);
        product.activate(at).unwrap();
        save_new(&store, &mut product, at).await;
        ids.push(product.id());
    }
    let mut other = new_product("garden", t0());
    other.activate(t0()).unwrap();
    save_new(&store, &mut other, t0()).await;
    let mut inactive = new_product("lighting", t0());
    save_new(&store, &mut inactive, t0()).await;

    let query = ActiveProductsQuery::new().category("lighting").page_size(2);
    let first = store.list_active(&query).await.unwrap();
    let first_ids: Vec<_> = first.items.iter().map(|r| r.id).collect();
    assert_eq!(first_ids, vec![ids[2], ids[1]]);
    assert_eq!(first.next_page_token.as_deref(), Some("2"));

    let second = store
        .list_active(&query.clone().page_token("2"))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, ids[0]);
    assert_eq!(second.next_page_token, None);

    let everything = store.list_active(&ActiveProductsQuery::new()).await.unwrap();
    assert_eq!(everything.items.len(), 4);
    let restarted = store
        .list_active(&query.clone().page_token("9223372036854775808"))
        .await
        .unwrap();
    let restarted_ids: Vec<_> = restarted.items.iter().map(|r| r.id).collect();
    assert_eq!(restarted_ids, first_ids);
}

#[tokio::test]
#[serial]
async fn run_migrations_is_idempotent() {
    let store = get_test_store().await;
    // Tables already exist from the raw SQL bootstrap.
    store.run_migrations().await.unwrap();
}
