//! Sliding-window rate limiting.
//!
//! # Data Flow
//! ```text
//! Admission pipeline:
//!     → store.rs check_and_record (atomic count + append per key)
//!     → one call per identity dimension (IP, wallet, account id)
//! ```
//!
//! # Design Decisions
//! - Timestamps are unix milliseconds; pruning is a read-time concern
//! - Atomicity is per key, provided inside the store
//! - Fail closed: a store error rejects the request, it never admits

pub mod store;

pub use store::{
    MemoryRateLimitStore, RateLimitDecision, RateLimitEntry, RateLimitStore, StoreError,
};
