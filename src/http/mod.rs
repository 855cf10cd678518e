//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, client-IP derivation)
//!     → admission pipeline (decision + transfer)
//!     → response.rs (error kind → status, JSON body)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::HttpServer;
