//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::AggregateId;

use crate::aggregate::AggregateRoot;
use crate::{Discount, DomainError, Money};

use super::{ChangeTracker, Field, ProductEvent, ProductStatus};

/// Persisted attributes of a product, as read back by the storage layer.
///
/// Passed to [`Product::rehydrate`], which trusts it: no validation runs and
/// no event is raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductState {
    pub id: AggregateId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Product aggregate root.
///
/// All state transitions go through methods on this type. Every method that
/// changes a field marks it dirty and queues the matching event; methods that
/// change nothing leave both untouched.
#[derive(Debug, Clone)]
pub struct Product {
    id: AggregateId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    changes: ChangeTracker,
    events: Vec<ProductEvent>,
}

impl AggregateRoot for Product {
    type Event = ProductEvent;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn pending_events(&self) -> &[ProductEvent] {
        &self.events
    }

    fn pull_pending_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.events)
    }
}

// Construction
impl Product {
    /// Creates a new product in the `Inactive` state and raises
    /// `ProductCreated`.
    ///
    /// Name, description and category are trimmed; name and category must be
    /// non-blank and the base price strictly positive.
    pub fn create(
        id: AggregateId,
        name: &str,
        description: &str,
        category: &str,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = non_blank(name, DomainError::InvalidName)?;
        let category = non_blank(category, DomainError::InvalidCategory)?;
        if !base_price.is_positive() {
            return Err(DomainError::InvalidPrice);
        }

        Ok(Self {
            id,
            name,
            description: description.trim().to_string(),
            category,
            base_price,
            discount: None,
            status: ProductStatus::Inactive,
            created_at: now,
            updated_at: now,
            archived_at: None,
            changes: ChangeTracker::new(),
            events: vec![ProductEvent::created(id, now)],
        })
    }

    /// Rebuilds a product from persisted state.
    pub fn rehydrate(state: ProductState) -> Self {
        Self {
            id: state.id,
            name: state.name,
            description: state.description,
            category: state.category,
            base_price: state.base_price,
            discount: state.discount,
            status: state.status,
            created_at: state.created_at,
            updated_at: state.updated_at,
            archived_at: state.archived_at,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }
}

// Query methods
impl Product {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Fields changed since the product was loaded or last persisted.
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Returns true if the product is archived.
    pub fn is_archived(&self) -> bool {
        self.status.is_terminal()
    }

    /// Clears the change tracker once the changes are durably saved.
    pub fn mark_persisted(&mut self) {
        self.changes.reset();
    }
}

// Command methods
impl Product {
    /// Replaces name, description and category.
    ///
    /// Only fields whose trimmed value differs are written and marked dirty;
    /// `ProductUpdated` is raised only when at least one of them changed.
    pub fn update_details(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_not_archived()?;
        let name = non_blank(name, DomainError::InvalidName)?;
        let category = non_blank(category, DomainError::InvalidCategory)?;
        let description = description.trim();

        let mut changed = false;
        if self.name != name {
            self.name = name;
            self.changes.mark_dirty(Field::Name);
            changed = true;
        }
        if self.description != description {
            self.description = description.to_string();
            self.changes.mark_dirty(Field::Description);
            changed = true;
        }
        if self.category != category {
            self.category = category;
            self.changes.mark_dirty(Field::Category);
            changed = true;
        }

        if changed {
            self.touch(now);
            self.events.push(ProductEvent::updated(self.id, now));
        }
        Ok(())
    }

    /// Moves the product to `Active`. Already active is a no-op.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_archived()?;
        if self.status != ProductStatus::Active {
            self.set_status(ProductStatus::Active, now);
            self.events.push(ProductEvent::activated(self.id, now));
        }
        Ok(())
    }

    /// Moves the product to `Inactive`. Already inactive is a no-op.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_archived()?;
        if self.status != ProductStatus::Inactive {
            self.set_status(ProductStatus::Inactive, now);
            self.events.push(ProductEvent::deactivated(self.id, now));
        }
        Ok(())
    }

    /// Archives the product. Archiving twice succeeds without changes.
    ///
    /// No event is raised.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_archived() {
            return Ok(());
        }
        self.set_status(ProductStatus::Archived, now);
        self.archived_at = Some(now);
        self.changes.mark_dirty(Field::ArchivedAt);
        Ok(())
    }

    /// Attaches `discount`.
    ///
    /// The product must be active, the discount must be valid at `now`, and
    /// any existing discount must not be valid at `now`. An expired or future
    /// discount is replaced.
    pub fn apply_discount(
        &mut self,
        discount: Discount,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_apply_discount() {
            return Err(DomainError::ProductNotActive);
        }
        if !discount.is_valid_at(now) {
            return Err(DomainError::InvalidDiscountPeriod);
        }
        if self.discount.as_ref().is_some_and(|d| d.is_valid_at(now)) {
            return Err(DomainError::OverlappingDiscount);
        }

        self.discount = Some(discount);
        self.changes.mark_dirty(Field::Discount);
        self.touch(now);
        self.events.push(ProductEvent::discount_applied(self.id, now));
        Ok(())
    }

    /// Clears the discount, whether or not it is currently valid.
    pub fn remove_discount(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_archived()?;
        if self.discount.take().is_none() {
            return Err(DomainError::NoDiscount);
        }

        self.changes.mark_dirty(Field::Discount);
        self.touch(now);
        self.events.push(ProductEvent::discount_removed(self.id, now));
        Ok(())
    }

    fn ensure_not_archived(&self) -> Result<(), DomainError> {
        if self.is_archived() {
            return Err(DomainError::ProductArchived);
        }
        Ok(())
    }

    fn set_status(&mut self, status: ProductStatus, now: DateTime<Utc>) {
        self.status = status;
        self.changes.mark_dirty(Field::Status);
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

fn non_blank(value: &str, error: DomainError) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_string())
}
