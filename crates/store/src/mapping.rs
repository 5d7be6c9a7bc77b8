//! Translation of the product aggregate into row mutations.

use domain::{AggregateRoot, Discount, Field, Money, Product};

use crate::mutation::{Mutation, Value};
use crate::schema::products as col;
use crate::{Result, StoreError};

/// Full-row insert for a newly created product.
pub fn product_insert(product: &Product) -> Result<Mutation> {
    let (price_numerator, price_denominator) = price_parts(product.base_price())?;
    let mut columns = vec![
        (col::PRODUCT_ID, Value::uuid(product.id().as_uuid())),
        (col::NAME, Value::text(product.name())),
        (col::DESCRIPTION, Value::text(product.description())),
        (col::CATEGORY, Value::text(product.category())),
        (col::BASE_PRICE_NUMERATOR, Value::int(price_numerator)),
        (col::BASE_PRICE_DENOMINATOR, Value::int(price_denominator)),
    ];
    columns.extend(discount_columns(product.discount())?);
    columns.extend([
        (col::STATUS, Value::text(product.status().as_str())),
        (col::CREATED_AT, Value::timestamp(product.created_at())),
        (col::UPDATED_AT, Value::timestamp(product.updated_at())),
        (col::ARCHIVED_AT, Value::Timestamp(product.archived_at())),
    ]);
    Ok(Mutation::insert(col::TABLE, columns))
}

/// Update of the dirty columns plus `updated_at`, or `None` when nothing is
/// dirty.
pub fn product_update(product: &Product) -> Result<Option<Mutation>> {
    let changes = product.changes();
    if changes.is_empty() {
        return Ok(None);
    }

    let mut columns = Vec::with_capacity(changes.len() + 4);
    for field in changes.fields() {
        match field {
            Field::Name => columns.push((col::NAME, Value::text(product.name()))),
            Field::Description => {
                columns.push((col::DESCRIPTION, Value::text(product.description())))
            }
            Field::Category => columns.push((col::CATEGORY, Value::text(product.category()))),
            Field::Status => columns.push((col::STATUS, Value::text(product.status().as_str()))),
            Field::Discount => columns.extend(discount_columns(product.discount())?),
            Field::ArchivedAt => {
                columns.push((col::ARCHIVED_AT, Value::Timestamp(product.archived_at())))
            }
        }
    }
    columns.push((col::UPDATED_AT, Value::timestamp(product.updated_at())));

    Ok(Some(Mutation::update(
        col::TABLE,
        (col::PRODUCT_ID, Value::uuid(product.id().as_uuid())),
        columns,
    )))
}

fn price_parts(price: &Money) -> Result<(i64, i64)> {
    price
        .to_i64_parts()
        .ok_or_else(|| StoreError::OutOfRange(format!("base price {price}")))
}

fn discount_columns(discount: Option<&Discount>) -> Result<[(&'static str, Value); 4]> {
    let Some(discount) = discount else {
        return Ok([
            (col::DISCOUNT_PERCENT_NUMERATOR, Value::Int(None)),
            (col::DISCOUNT_PERCENT_DENOMINATOR, Value::Int(None)),
            (col::DISCOUNT_START_DATE, Value::Timestamp(None)),
            (col::DISCOUNT_END_DATE, Value::Timestamp(None)),
        ]);
    };

    let (numerator, denominator) = discount.percentage_parts().ok_or_else(|| {
        StoreError::OutOfRange(format!("discount percentage {}", discount.percentage()))
    })?;
    Ok([
        (col::DISCOUNT_PERCENT_NUMERATOR, Value::int(numerator)),
        (col::DISCOUNT_PERCENT_DENOMINATOR, Value::int(denominator)),
        (col::DISCOUNT_START_DATE, Value::timestamp(discount.start())),
        (col::DISCOUNT_END_DATE, Value::timestamp(discount.end())),
    ])
}
