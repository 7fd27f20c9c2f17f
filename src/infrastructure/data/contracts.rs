// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ILendingPoolAddressesProvider {
        function getLendingPoolConfigurator() external view returns (address);
        function getCoveragePool() external view returns (address);

        function setCoveragePoolImpl(address pool) external;
    }

    #[sol(rpc)]
    interface ILendingPoolConfigurator {
        function setPoolPause(bool val) external;
    }

    #[sol(rpc)]
    interface ICoveragePool {
        function valueOfToken(address token, uint256 index) external view returns (uint256);
        function initializeBond(address asset, address bond) external;
    }

    #[sol(rpc)]
    interface IWETHGateway {
        function depositETH(address lendingPool, address onBehalfOf, uint16 referralCode) external payable;
    }
}
