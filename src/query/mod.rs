//! Keyed cache in front of the remote store.
//!
//! Reads go through [`QueryClient::query`], which serves fresh values from
//! memory and de-duplicates concurrent fetches of the same key. Writes never
//! touch cached values directly; they invalidate keys and the next read
//! fetches again.

pub mod client;
pub mod keys;

pub use client::{PollHandle, QueryClient, QueryOptions, QuerySnapshot, QueryStatus};
pub use keys::{Cached, Invalidate, KeyFamily, QueryKey, QueryValue};
