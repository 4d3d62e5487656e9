//! Price store adapters.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryPriceStore;
pub use postgres::PgPriceStore;
