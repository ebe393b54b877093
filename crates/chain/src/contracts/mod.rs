//! Contract bindings.
//!
//! Interface subsets for every contract the service reads from or sends
//! through. Each module groups one concern:
//! - [`common`]: ERC-20 and proxy-token probing
//! - [`lending`]: position views of the supported lending protocols
//! - [`wallet`]: DSProxy and Safe execution entry points
//! - [`automation`]: strategy subscription contracts

pub mod automation;
pub mod common;
pub mod lending;
pub mod wallet;

pub use automation::{ISubProxy, ISubStorage, StrategySub};
pub use common::{IProxyERC20, ISynth, IERC20};
pub use lending::{
    IAaveV3Pool, IComet, ICrvUsdController, IDssCdpManager, IFluidVaultResolver, IMorphoBlue,
    ITroveManager, ITroveManagerV2, IVat,
};
pub use wallet::{IDSProxy, ISafe};
