//! Forkooor chain interaction layer.
//!
//! This crate provides:
//! - Per-request fork sessions and the fork debug RPC methods
//! - Proxy token resolution
//! - Balance overrides through storage writes, with read-back verification
//! - Impersonated transaction sending and smart wallet execution
//! - Position readers for Aave V3, Spark, Compound V3, Morpho Blue and Liquity
//! - Automation strategy subscriptions
//!
//! Every operation takes a [`ForkSession`]; nothing holds a process-wide
//! network binding.

pub mod automation;
pub mod balance;
pub mod contracts;
mod error;
pub mod positions;
pub mod proxy_token;
mod sender;
mod session;
#[cfg(test)]
mod testing;
pub mod token;
pub mod wallet;

pub use automation::{AutomationContracts, Subscription};
pub use balance::{set_eth_balance, set_token_balance, BalanceOverride, StorageWriteRequest};
pub use error::{ChainError, Result};
pub use positions::{reader_for, PositionReader, PositionView};
pub use proxy_token::TokenResolution;
pub use sender::ImpersonatedSender;
pub use session::{fork_url, ForkSession, NetworkSelector};
pub use wallet::{SmartWallet, WalletType};
