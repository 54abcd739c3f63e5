// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository registry contract interface.
//!
//! Function names are the deployed contract's ABI. `publicValue1` carries
//! the file count, `publicValue2` is reserved (always zero), and the
//! confidential size is an encrypted `uint32` referenced by a `bytes32`
//! handle.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IRepoRegistry {
        function getAllBusinessIds() external view returns (string[] memory);

        function getBusinessData(string calldata businessId) external view returns (
            string memory name,
            uint256 publicValue1,
            uint256 publicValue2,
            string memory description,
            address creator,
            uint256 timestamp,
            bool isVerified,
            uint32 decryptedValue
        );

        function getEncryptedValue(string calldata businessId) external view returns (bytes32);

        function createBusinessData(
            string calldata businessId,
            string calldata name,
            bytes32 encryptedValue,
            bytes calldata inputProof,
            uint256 publicValue1,
            uint256 publicValue2,
            string calldata description
        ) external;

        function verifyDecryption(
            string calldata businessId,
            bytes calldata abiEncodedClearValue,
            bytes calldata decryptionProof
        ) external;

        function isAvailable() external view returns (bool);
    }
}
