//! Devnet airdrop faucet service library.

pub mod admission;
pub mod blockchain;
pub mod captcha;
pub mod config;
pub mod http;
pub mod identity;
pub mod observability;
pub mod ratelimit;
pub mod records;

pub use admission::AdmissionPipeline;
pub use config::FaucetConfig;
pub use http::HttpServer;
