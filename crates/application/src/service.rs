//! Product service running the command side.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{AggregateId, Clock};
use domain::{AggregateRoot, Discount, DomainError, Money, Product};
use store::{CommitPlan, OutboxRepository, PlanApplier, ProductRepository, build_outbox_events};

use crate::commands::{ApplyDiscount, CreateProduct, UpdateProduct};
use crate::error::{CommandError, Result};

/// Service for managing products.
///
/// Every command follows the same path: load the product, read the clock
/// once, call one aggregate method, collect the product mutation and one
/// outbox row per raised event in a [`CommitPlan`], and apply the plan
/// atomically. The change tracker is cleared only after a successful apply.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    outbox: Arc<dyn OutboxRepository>,
    applier: Arc<dyn PlanApplier>,
    clock: Arc<dyn Clock>,
}

impl ProductService {
    /// Creates a new product service from its collaborators.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        outbox: Arc<dyn OutboxRepository>,
        applier: Arc<dyn PlanApplier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            outbox,
            applier,
            clock,
        }
    }

    /// Creates a product and returns its ID.
    #[tracing::instrument(skip(self), fields(product_id = %cmd.product_id))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<AggregateId> {
        let outcome = self.create(cmd).await;
        record("create_product", &outcome);
        outcome
    }

    /// Replaces a product's name, description and category.
    #[tracing::instrument(skip(self), fields(product_id = %cmd.product_id))]
    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<()> {
        self.execute("update_product", cmd.product_id, |product, now| {
            product.update_details(&cmd.name, &cmd.description, &cmd.category, now)
        })
        .await
    }

    /// Makes a product sellable.
    #[tracing::instrument(skip(self))]
    pub async fn activate_product(&self, product_id: AggregateId) -> Result<()> {
        self.execute("activate_product", product_id, |product, now| {
            product.activate(now)
        })
        .await
    }

    /// Takes a product off sale.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate_product(&self, product_id: AggregateId) -> Result<()> {
        self.execute("deactivate_product", product_id, |product, now| {
            product.deactivate(now)
        })
        .await
    }

    /// Archives a product. Archiving an archived product succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn archive_product(&self, product_id: AggregateId) -> Result<()> {
        self.execute("archive_product", product_id, |product, now| {
            product.archive(now)
        })
        .await
    }

    /// Attaches a discount to an active product.
    #[tracing::instrument(skip(self), fields(product_id = %cmd.product_id))]
    pub async fn apply_discount(&self, cmd: ApplyDiscount) -> Result<()> {
        self.execute("apply_discount", cmd.product_id, |product, now| {
            let percentage = Discount::parse_percentage(&cmd.percent)?;
            let discount = Discount::new(percentage, cmd.start, cmd.end)?;
            product.apply_discount(discount, now)
        })
        .await
    }

    /// Clears a product's discount.
    #[tracing::instrument(skip(self))]
    pub async fn remove_discount(&self, product_id: AggregateId) -> Result<()> {
        self.execute("remove_discount", product_id, |product, now| {
            product.remove_discount(now)
        })
        .await
    }

    async fn create(&self, cmd: CreateProduct) -> Result<AggregateId> {
        let now = self.clock.now();
        let price = Money::new(cmd.price_numerator, cmd.price_denominator)?;
        let mut product = Product::create(
            cmd.product_id,
            &cmd.name,
            &cmd.description,
            &cmd.category,
            price,
            now,
        )?;

        let mut plan = CommitPlan::new();
        plan.add(
            self.products
                .insert_op(&product)
                .map_err(CommandError::Plan)?,
        );
        self.commit(&mut product, plan, now).await?;
        Ok(product.id())
    }

    /// Loads the product, runs `mutate` on it and commits the result.
    async fn execute<F>(
        &self,
        command: &'static str,
        product_id: AggregateId,
        mutate: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> std::result::Result<(), DomainError> + Send,
    {
        let outcome = async {
            let mut product = self
                .products
                .find_by_id(product_id)
                .await
                .map_err(CommandError::from_load)?;
            let now = self.clock.now();
            mutate(&mut product, now)?;

            let mut plan = CommitPlan::new();
            if let Some(op) = self
                .products
                .update_op(&product)
                .map_err(CommandError::Plan)?
            {
                plan.add(op);
            }
            self.commit(&mut product, plan, now).await
        }
        .await;

        record(command, &outcome);
        outcome
    }

    /// Appends the outbox rows for the pending events and applies the plan.
    async fn commit(
        &self,
        product: &mut Product,
        mut plan: CommitPlan,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let events = product.pull_pending_events();
        let outbox_events = build_outbox_events(&events, now)?;
        plan.extend(outbox_events.iter().map(|e| self.outbox.insert_event_op(e)));

        if plan.is_empty() {
            tracing::debug!("nothing changed, skipping commit");
            return Ok(());
        }

        let operations = plan.len();
        self.applier.apply(plan).await.map_err(|e| {
            tracing::warn!(error = %e, operations, "commit plan was not applied");
            CommandError::Apply(e)
        })?;
        product.mark_persisted();

        for event in &outbox_events {
            metrics::counter!("catalog_outbox_events_total", "event_type" => event.event_type.clone())
                .increment(1);
        }
        tracing::info!(operations, events = outbox_events.len(), "committed product changes");
        Ok(())
    }
}

fn record<T>(command: &'static str, outcome: &Result<T>) {
    let outcome = match outcome {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!("catalog_commands_total", "command" => command, "outcome" => outcome)
        .increment(1);
}
