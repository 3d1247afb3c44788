pub mod http;
pub mod memory;
pub mod traits;
pub mod types;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use traits::MarketplaceStore;
pub use types::{StoreError, StoreResult};
