pub mod error;
pub mod schema_cache;
pub mod store;

pub use error::StoreError;
pub use schema_cache::{SchemaCache, SchemaDescriptor};
pub use store::StateStore;
