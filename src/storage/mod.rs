//! Storage backends for accounts, tenants and refresh sessions

pub mod memory;
pub mod traits;

// Re-export the storage interfaces
pub use memory::{create_memory_storage, MemoryStorage, SharedMemoryStorage};
pub use traits::{
    hash_token, RefreshTokenStorage, RestaurantStorage, StorageProvider, StoredRefreshToken,
    UserStorage,
};
