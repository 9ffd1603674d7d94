// Service exports
pub mod memory;
pub mod pairing;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pairing::{PairingService, ServiceError};
pub use postgres::PostgresStore;
pub use store::{PairingStore, StoreError};
