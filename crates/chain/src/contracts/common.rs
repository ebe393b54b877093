//! Common contract interfaces shared across protocols.

use alloy::sol;

// ERC20 interface for token interactions
sol! {
    /// Standard ERC20 interface (subset for balance overrides and approvals)
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}

// Proxy tokens keep balances behind two hops: proxy -> implementation -> state
sol! {
    /// Proxy ERC20 front contract
    #[sol(rpc)]
    interface IProxyERC20 {
        function target() external view returns (address);
    }

    /// Implementation behind a proxy ERC20 that keeps balances in a state contract
    #[sol(rpc)]
    interface ISynth {
        function tokenState() external view returns (address);
    }
}
