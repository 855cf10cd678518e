//! Airdrop admission subsystem — the core of the service.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → pipeline.rs (fixed-order checks, short-circuit on rejection)
//!         → identity.rs (IP normalization, trust tier → policy)
//!         → validate.rs (wallet syntax, on-curve, amount bounds)
//!         → bypass.rs (operator token allow-list)
//!         → captcha / ratelimit / identity collaborators
//!     → blockchain executor (transfer)
//!     → records collaborator (best-effort persistence)
//! ```
//!
//! # Design Decisions
//! - One canonical pipeline; no per-route variants
//! - Typed error taxonomy; the HTTP layer maps kind → status
//! - Config is injected as an immutable snapshot at construction

pub mod bypass;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod types;
pub mod validate;

pub use bypass::BypassAuthority;
pub use error::AdmissionError;
pub use identity::normalize_ip;
pub use pipeline::AdmissionPipeline;
pub use types::{Admission, AirdropRequest, TrustTier};
pub use validate::validate_transfer;
