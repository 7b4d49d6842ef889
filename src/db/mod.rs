pub mod postgres;
pub mod products;

pub use postgres::{connect_pool, Database};
