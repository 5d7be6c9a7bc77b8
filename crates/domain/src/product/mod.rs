//! Product aggregate with its status, change tracking and events.

mod aggregate;
mod changes;
mod events;
mod state;

pub use aggregate::{Product, ProductState};
pub use changes::{ChangeTracker, Field};
pub use events::{EventMeta, ProductEvent};
pub use state::{ProductStatus, UnknownStatus};
