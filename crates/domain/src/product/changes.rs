//! Dirty-field tracking for partial updates.

/// An attribute of the product that can be persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Description,
    Category,
    Status,
    Discount,
    ArchivedAt,
}

impl Field {
    /// Every field, in persistence order.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Description,
        Field::Category,
        Field::Status,
        Field::Discount,
        Field::ArchivedAt,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Category => "category",
            Field::Status => "status",
            Field::Discount => "discount",
            Field::ArchivedAt => "archived_at",
        }
    }
}

/// The set of fields changed since the aggregate was loaded or last saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeTracker {
    dirty: u8,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `field` changed.
    pub fn mark_dirty(&mut self, field: Field) {
        self.dirty |= field.bit();
    }

    pub fn is_dirty(&self, field: Field) -> bool {
        self.dirty & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.dirty == 0
    }

    /// Number of dirty fields.
    pub fn len(&self) -> usize {
        self.dirty.count_ones() as usize
    }

    /// Dirty fields in persistence order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.is_dirty(*f))
    }

    /// Clears every mark; called once the changes are durably saved.
    pub fn reset(&mut self) {
        self.dirty = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_clean() {
        let tracker = ChangeTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
        assert!(Field::ALL.iter().all(|f| !tracker.is_dirty(*f)));
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_dirty(Field::Name);
        tracker.mark_dirty(Field::Name);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_dirty(Field::Name));
        assert!(!tracker.is_dirty(Field::Category));
    }

    #[test]
    fn test_fields_are_listed_in_persistence_order() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_dirty(Field::ArchivedAt);
        tracker.mark_dirty(Field::Name);
        tracker.mark_dirty(Field::Status);
        let fields: Vec<_> = tracker.fields().collect();
        assert_eq!(fields, vec![Field::Name, Field::Status, Field::ArchivedAt]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tracker = ChangeTracker::new();
        for field in Field::ALL {
            tracker.mark_dirty(field);
        }
        assert_eq!(tracker.len(), Field::ALL.len());
        tracker.reset();
        assert!(tracker.is_empty());
    }
}
