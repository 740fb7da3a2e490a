mod connection;
pub mod queries;
pub mod schema;

pub use connection::{DatabaseConfig, Db, create_connection, ensure_schema};
pub use queries::QueryBuilder;
