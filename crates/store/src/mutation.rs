//! Row mutations and the commit plan that carries them to an applier.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A typed, nullable column value.
///
/// Nulls keep their type so a backend can bind them without guessing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(Option<String>),
    Int(Option<i64>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
    Json(serde_json::Value),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(Some(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Value::Int(Some(value))
    }

    pub fn uuid(value: Uuid) -> Self {
        Value::Uuid(Some(value))
    }

    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(value))
    }

    /// Returns true if this is a null of any type.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Text(v) => v.is_none(),
            Value::Int(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Json(v) => v.is_null(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => *v,
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(v) => *v,
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => *v,
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Whether a mutation creates a row or changes an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
}

/// A write against one row of one table.
///
/// The first column is always the row's primary key. An insert carries every
/// column; an update carries the key followed by the columns to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    table: &'static str,
    kind: MutationKind,
    columns: Vec<(&'static str, Value)>,
}

impl Mutation {
    /// Creates an insert of a full row.
    pub fn insert(table: &'static str, columns: Vec<(&'static str, Value)>) -> Self {
        Self {
            table,
            kind: MutationKind::Insert,
            columns,
        }
    }

    /// Creates an update of the row whose key is `key`.
    pub fn update(
        table: &'static str,
        key: (&'static str, Value),
        columns: Vec<(&'static str, Value)>,
    ) -> Self {
        let mut all = Vec::with_capacity(columns.len() + 1);
        all.push(key);
        all.extend(columns);
        Self {
            table,
            kind: MutationKind::Update,
            columns: all,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// The key column and its value.
    pub fn key(&self) -> Option<&(&'static str, Value)> {
        self.columns.first()
    }

    /// Every column in order, key first.
    pub fn columns(&self) -> &[(&'static str, Value)] {
        &self.columns
    }

    /// The value written to `column`, if this mutation writes it.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn into_columns(self) -> Vec<(&'static str, Value)> {
        self.columns
    }
}

/// An ordered batch of mutations committed as one atomic unit.
///
/// Use cases add the aggregate's mutation first and its outbox rows after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    operations: Vec<Mutation>,
}

impl CommitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one mutation.
    pub fn add(&mut self, mutation: Mutation) {
        self.operations.push(mutation);
    }

    /// Appends every mutation, keeping their order.
    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.operations.extend(mutations);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The mutations in the order they were added.
    pub fn operations(&self) -> &[Mutation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Mutation> {
        self.operations
    }
}

impl FromIterator<Mutation> for CommitPlan {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_puts_key_first() {
        let id = Uuid::new_v4();
        let mutation = Mutation::update(
            "products",
            ("product_id", Value::uuid(id)),
            vec![("name", Value::text("Lamp"))],
        );

        assert_eq!(mutation.kind(), MutationKind::Update);
        assert_eq!(mutation.key(), Some(&("product_id", Value::uuid(id))));
        assert_eq!(mutation.value("name"), Some(&Value::text("Lamp")));
        assert_eq!(mutation.value("category"), None);
    }

    #[test]
    fn plan_keeps_insertion_order() {
        let mut plan = CommitPlan::new();
        assert!(plan.is_empty());

        plan.add(Mutation::insert("a", vec![]));
        plan.extend([Mutation::insert("b", vec![]), Mutation::insert("c", vec![])]);

        let tables: Vec<_> = plan.operations().iter().map(Mutation::table).collect();
        assert_eq!(tables, vec!["a", "b", "c"]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn typed_nulls() {
        assert!(Value::Text(None).is_null());
        assert!(Value::Timestamp(None).is_null());
        assert!(Value::Json(serde_json::Value::Null).is_null());
        assert!(!Value::int(0).is_null());
        assert_eq!(Value::Int(None).as_int(), None);
        assert_eq!(Value::text("x").as_int(), None);
    }
}
