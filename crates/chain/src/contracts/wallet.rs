//! Smart wallet execution entry points.

use alloy::sol;

sol! {
    /// DSProxy: delegate-calls `target` with `data`
    #[sol(rpc)]
    interface IDSProxy {
        function execute(address target, bytes data) external payable returns (bytes32 response);
    }
}

sol! {
    /// Gnosis Safe (v1.3+)
    #[sol(rpc)]
    interface ISafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes signatures
        ) external payable returns (bool success);
    }
}
