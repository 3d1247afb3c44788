pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::{bike, marketplace, short_cache};
#[allow(unused_imports)]
pub use mocks::InstrumentedStore;
