//! Caching of built change artifacts.
//!
//! Artifacts are keyed per (page, language, theme, permission-hash) variant
//! and stored in a tag-aware backend so host-side content invalidation
//! evicts them automatically.

mod changes;
mod key;
mod single_flight;
mod store;

pub use changes::ChangeCache;
pub use key::CacheVariantKey;
pub use single_flight::{FlightGuard, SingleFlight};
pub use store::{CacheStore, MemoryCacheStore};
