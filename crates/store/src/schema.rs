//! Table and column names shared by the mutations, the in-memory tables and
//! the SQL migrations.

pub mod products {
    pub const TABLE: &str = "products";

    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const BASE_PRICE_NUMERATOR: &str = "base_price_numerator";
    pub const BASE_PRICE_DENOMINATOR: &str = "base_price_denominator";
    pub const DISCOUNT_PERCENT_NUMERATOR: &str = "discount_percent_numerator";
    pub const DISCOUNT_PERCENT_DENOMINATOR: &str = "discount_percent_denominator";
    pub const DISCOUNT_START_DATE: &str = "discount_start_date";
    pub const DISCOUNT_END_DATE: &str = "discount_end_date";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const ARCHIVED_AT: &str = "archived_at";

    /// Every column, in insert order.
    pub const ALL: [&str; 14] = [
        PRODUCT_ID,
        NAME,
        DESCRIPTION,
        CATEGORY,
        BASE_PRICE_NUMERATOR,
        BASE_PRICE_DENOMINATOR,
        DISCOUNT_PERCENT_NUMERATOR,
        DISCOUNT_PERCENT_DENOMINATOR,
        DISCOUNT_START_DATE,
        DISCOUNT_END_DATE,
        STATUS,
        CREATED_AT,
        UPDATED_AT,
        ARCHIVED_AT,
    ];
}

pub mod outbox_events {
    pub const TABLE: &str = "outbox_events";

    pub const EVENT_ID: &str = "event_id";
    pub const EVENT_TYPE: &str = "event_type";
    pub const AGGREGATE_ID: &str = "aggregate_id";
    pub const PAYLOAD: &str = "payload";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const PROCESSED_AT: &str = "processed_at";

    pub const ALL: [&str; 7] = [
        EVENT_ID,
        EVENT_TYPE,
        AGGREGATE_ID,
        PAYLOAD,
        STATUS,
        CREATED_AT,
        PROCESSED_AT,
    ];
}
