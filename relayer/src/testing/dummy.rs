//! Utilities for generating dummy values for tests.

use rand::Rng;

use crate::model::{
    ChainHashes, DepositDates, DepositReceipt, DepositRecord, DepositStatus, FundingTx,
    L1OutputEvent, RevealTuple,
};

/// A random 32-byte hex string, suitable as a `funding_tx_hash`.
pub fn funding_tx_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

fn bytes<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("0x{}", hex::encode(bytes(rng, 20)))
}

/// A dummy reveal tuple with random opaque fields.
pub fn reveal_tuple<R: Rng + ?Sized>(rng: &mut R, output_index: u32) -> RevealTuple {
    RevealTuple {
        output_index,
        blinding_factor: bytes(rng, 32),
        wallet_public_key_hash: bytes(rng, 20),
        refund_public_key_hash: bytes(rng, 20),
        refund_locktime: bytes(rng, 4),
        extra_data: bytes(rng, 32),
    }
}

/// A dummy deposit record in the given status, with internally-consistent
/// transaction hashes and timestamps for that status.
pub fn deposit_record<R: Rng + ?Sized>(rng: &mut R, status: DepositStatus) -> DepositRecord {
    let funding_tx_hash = funding_tx_hash(rng);
    let output_index = rng.gen_range(0..4);
    let id = crate::model::deposit_id(&funding_tx_hash, output_index).unwrap();
    let owner = address(rng);

    let receipt = DepositReceipt {
        depositor: address(rng),
        blinding_factor: bytes(rng, 32),
        wallet_public_key_hash: bytes(rng, 20),
        refund_public_key_hash: bytes(rng, 20),
        refund_locktime: bytes(rng, 4),
        extra_data: bytes(rng, 16),
    };
    let l1_output_event = L1OutputEvent {
        funding_tx: FundingTx {
            version: bytes(rng, 4),
            input_vector: bytes(rng, 41),
            output_vector: bytes(rng, 31),
            locktime: bytes(rng, 4),
        },
        reveal: reveal_tuple(rng, output_index),
        l2_deposit_owner: owner.clone(),
        l2_sender: address(rng),
    };

    let created_at: i64 = rng.gen_range(1_000..2_000);
    let (initialize_tx_hash, initialization_at) = if status >= DepositStatus::Initialized {
        (
            Some(format!("0x{}", hex::encode(bytes(rng, 32)))),
            Some(created_at + 100),
        )
    } else {
        (None, None)
    };
    let (finalize_tx_hash, finalization_at) = if status == DepositStatus::Finalized {
        (
            Some(format!("0x{}", hex::encode(bytes(rng, 32)))),
            Some(created_at + 200),
        )
    } else {
        (None, None)
    };

    DepositRecord {
        id,
        funding_tx_hash,
        output_index,
        receipt,
        l1_output_event,
        owner,
        status,
        hashes: ChainHashes {
            initialize_tx_hash,
            finalize_tx_hash,
        },
        dates: DepositDates {
            created_at,
            initialization_at,
            finalization_at,
            last_activity_at: created_at,
        },
        error: None,
    }
}
