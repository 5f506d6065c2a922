//! Typed ABI bindings for the three contracts the EVM handler talks to.
//!
//! Contract ABIs are out of scope per the specification beyond the verb
//! set in its external interfaces section; these are minimal fragments
//! covering exactly those verbs, declared inline with `sol!` rather than
//! loaded from a generated JSON artifact.

use alloy::sol;

sol! {
    #[derive(Debug)]
    struct FundingTx {
        bytes version;
        bytes inputVector;
        bytes outputVector;
        bytes locktime;
    }

    #[derive(Debug)]
    struct Reveal {
        uint32 fundingOutputIndex;
        bytes blindingFactor;
        bytes walletPubKeyHash;
        bytes refundPubKeyHash;
        bytes refundLocktime;
        bytes extraData;
    }

    #[sol(rpc)]
    interface L1BitcoinDepositor {
        function initializeDeposit(FundingTx calldata fundingTx, Reveal calldata reveal, address l2DepositOwner) external;
        function finalizeDeposit(uint256 depositKey) external payable;
        function quoteFinalizeDeposit() external view returns (uint256);
        function deposits(uint256 depositKey) external view returns (uint256);
    }

    #[sol(rpc)]
    interface L2BitcoinDepositor {
        event DepositInitialized(FundingTx fundingTx, Reveal reveal, address l2DepositOwner, address l2Sender);
    }

    #[sol(rpc)]
    interface TBTCVault {
        event OptimisticMintingFinalized(address indexed minter, uint256 indexed depositKey, address indexed depositor, uint256 optimisticMintingDebt);
    }
}
