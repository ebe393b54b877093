//! Lending protocol view interfaces.

use alloy::sol;

sol! {
    /// Aave V3 Pool (also deployed by Spark)
    #[sol(rpc)]
    interface IAaveV3Pool {
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralBase,
            uint256 totalDebtBase,
            uint256 availableBorrowsBase,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );
    }
}

sol! {
    /// Compound V3 market (Comet)
    #[sol(rpc)]
    interface IComet {
        function baseToken() external view returns (address);
        function balanceOf(address account) external view returns (uint256);
        function borrowBalanceOf(address account) external view returns (uint256);
        function collateralBalanceOf(address account, address asset) external view returns (uint128);
    }
}

sol! {
    /// Morpho Blue singleton
    #[sol(rpc)]
    interface IMorphoBlue {
        function position(bytes32 id, address user) external view returns (
            uint256 supplyShares,
            uint128 borrowShares,
            uint128 collateral
        );
    }
}

sol! {
    /// Liquity V1 TroveManager
    #[sol(rpc)]
    interface ITroveManager {
        function getEntireDebtAndColl(address borrower) external view returns (
            uint256 debt,
            uint256 coll,
            uint256 pendingLUSDDebtReward,
            uint256 pendingETHReward
        );
        function getTroveStatus(address borrower) external view returns (uint256);
    }
}

sol! {
    /// Liquity V2 TroveManager (one per collateral branch); troves are keyed by NFT id
    #[sol(rpc)]
    interface ITroveManagerV2 {
        function getLatestTroveData(uint256 troveId) external view returns (
            uint256 entireDebt,
            uint256 entireColl,
            uint256 redistBoldDebtGain,
            uint256 redistCollGain,
            uint256 accruedInterest,
            uint256 recordedDebt,
            uint256 annualInterestRate,
            uint256 weightedRecordedDebt,
            uint256 accruedBatchManagementFee,
            uint256 lastInterestRateAdjTime
        );
        function getTroveStatus(uint256 troveId) external view returns (uint8);
    }
}

sol! {
    /// CurveUSD market controller
    #[sol(rpc)]
    interface ICrvUsdController {
        /// [collateral, stablecoin, debt, bands]
        function user_state(address user) external view returns (uint256[4]);
        function health(address user, bool full) external view returns (int256);
        function loan_exists(address user) external view returns (bool);
    }
}

sol! {
    /// Maker CDP manager: maps vault ids to urns
    #[sol(rpc)]
    interface IDssCdpManager {
        function urns(uint256 cdp) external view returns (address);
        function ilks(uint256 cdp) external view returns (bytes32);
        function owns(uint256 cdp) external view returns (address);
    }

    /// Maker Vat
    #[sol(rpc)]
    interface IVat {
        function urns(bytes32 ilk, address urn) external view returns (uint256 ink, uint256 art);
        function ilks(bytes32 ilk) external view returns (
            uint256 totalArt,
            uint256 rate,
            uint256 spot,
            uint256 line,
            uint256 dust
        );
    }
}

sol! {
    /// Fluid vault resolver. `positionByNftId` also returns the vault data
    /// after the position; only the leading position fields are decoded.
    #[sol(rpc)]
    interface IFluidVaultResolver {
        function positionByNftId(uint256 nftId) external view returns (
            uint256 id,
            address owner,
            bool isLiquidated,
            bool isSupplyPosition,
            int256 tick,
            uint256 tickId,
            uint256 beforeSupply,
            uint256 beforeBorrow,
            uint256 beforeDustBorrow,
            uint256 supply,
            uint256 borrow,
            uint256 dustBorrow
        );
        function vaultByNftId(uint256 nftId) external view returns (address);
    }
}
