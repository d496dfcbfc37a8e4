//! Infrastructure adapters behind the [`crate::traits::UserStore`] and
//! [`crate::traits::Cache`] ports.

pub mod cache;
pub mod postgres;

pub use cache::RedisCache;
pub use postgres::PgUserStore;
