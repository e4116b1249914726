// Repositories module - data access layer

pub mod catalog_repository;
pub mod pool;
pub mod schema_manager;
pub mod user_repository;

pub use catalog_repository::{CatalogRepository, SqliteCatalogRepository};
pub use pool::create_pool;
pub use schema_manager::SchemaManager;
pub use user_repository::{SqliteUserRepository, UserRepository};
