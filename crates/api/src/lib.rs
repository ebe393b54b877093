//! HTTP surface of the fork-testing backend.
//!
//! - `server`: axum routes for balances, chain time, positions and automation
//! - `tenderly`: REST lookup of virtual testnet RPC URLs

pub mod server;
pub mod tenderly;

pub use server::{router, serve, ApiError, AppState};
pub use tenderly::TenderlyClient;
