pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod resolver;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{BaselineProduct, BaselineSeed, SeedOutcome, VerificationResult};
pub use migrations::{ensure_schema, SchemaError};
pub use repositories::{
    InMemoryProductRepository, ProductRepository, RepositoryError, SqlProductRepository,
};
pub use resolver::{ProductResolver, ResolveError};
