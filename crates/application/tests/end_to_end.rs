//! Command and query sides wired to one in-memory store.

use std::sync::Arc;

use application::{ApplyDiscount, CreateProduct, ProductService, UpdateProduct};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::FixedClock;
use queries::{GetProduct, ListProducts, ProductQueries};
use store::{InMemoryStore, OutboxReader, OutboxStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
}

struct Harness {
    store: InMemoryStore,
    clock: FixedClock,
    commands: ProductService,
    queries: ProductQueries,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let clock = FixedClock::at(t0());
    let commands = ProductService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
    );
    let queries = ProductQueries::new(Arc::new(store.clone()), Arc::new(clock.clone()));
    Harness {
        store,
        clock,
        commands,
        queries,
    }
}

#[tokio::test]
async fn discounted_product_is_priced_and_announced() {
    let h = harness();

    let id = h
        .commands
        .create_product(CreateProduct::new("Desk Lamp", "LED", "lighting", 1000, 100))
        .await
        .unwrap();
    h.commands.activate_product(id).await.unwrap();
    let applies_before_discount = h.store.apply_count();
    h.commands
        .apply_discount(ApplyDiscount::new(
            id,
            "20",
            t0(),
            t0() + Duration::days(7),
        ))
        .await
        .unwrap();

    // Product row and outbox row went out in a single commit.
    assert_eq!(h.store.apply_count(), applies_before_discount + 1);

    let view = h.queries.get_product(GetProduct::new(id)).await.unwrap();
    assert_eq!(view.effective_price, "8.00");

    let discount_events: Vec<_> = h
        .store
        .events_for_aggregate(id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == "product.discount_applied")
        .collect();
    assert_eq!(discount_events.len(), 1);
    assert_eq!(discount_events[0].status, OutboxStatus::Pending);
    assert_eq!(discount_events[0].payload["aggregate_id"], id.to_string());
}

#[tokio::test]
async fn listing_follows_lifecycle() {
    let h = harness();

    let lamp = h
        .commands
        .create_product(CreateProduct::new("Desk Lamp", "", "lighting", 2500, 100))
        .await
        .unwrap();
    h.clock.advance(Duration::seconds(1));
    let bulb = h
        .commands
        .create_product(CreateProduct::new("Bulb", "", "lighting", 300, 100))
        .await
        .unwrap();

    let listed = h.queries.list_products(ListProducts::default()).await.unwrap();
    assert!(listed.products.is_empty());

    h.commands.activate_product(lamp).await.unwrap();
    h.commands.activate_product(bulb).await.unwrap();
    h.commands
        .update_product(UpdateProduct::new(bulb, "LED Bulb", "", "lighting"))
        .await
        .unwrap();

    let listed = h.queries.list_products(ListProducts::default()).await.unwrap();
    let names: Vec<_> = listed.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["LED Bulb", "Desk Lamp"]);

    h.commands.archive_product(lamp).await.unwrap();
    let listed = h.queries.list_products(ListProducts::default()).await.unwrap();
    assert_eq!(listed.products.len(), 1);

    let archived = h.queries.get_product(GetProduct::new(lamp)).await.unwrap();
    assert!(archived.archived_at.is_some());
}
