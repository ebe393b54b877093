//! Automation subscription contracts.

use alloy::sol;

sol! {
    /// Subscription record accepted by the SubProxy
    #[derive(Debug)]
    struct StrategySub {
        uint64 strategyOrBundleId;
        bool isBundle;
        bytes[] triggerData;
        bytes32[] subData;
    }

    /// Entry point a smart wallet delegate-calls to subscribe
    #[sol(rpc)]
    interface ISubProxy {
        function subscribeToStrategy(StrategySub _sub) external;
    }

    /// Registry of all subscriptions
    #[sol(rpc)]
    interface ISubStorage {
        function getSubsCount() external view returns (uint256);
    }
}
