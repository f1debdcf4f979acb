//! Transaction envelope construction.
//!
//! Envelopes are legacy (EIP-155) transactions: the submission request
//! carries a single gas price, not a fee market pair.

use alloy::consensus::{Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

/// Unsigned contract call ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    /// Destination contract.
    pub to: Address,
    /// Opaque call data.
    pub input: Bytes,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    /// Chain ID for EIP-155 replay protection.
    pub chain_id: u64,
    pub nonce: u64,
}

impl TransactionEnvelope {
    pub(crate) fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: U256::ZERO,
            input: self.input.clone(),
        }
    }
}

/// A signed, wire-encoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Transaction hash.
    pub hash: TxHash,
    /// EIP-2718 encoding for `eth_sendRawTransaction`.
    pub raw: Bytes,
    /// Nonce the transaction was signed with.
    pub nonce: u64,
}

impl From<Signed<TxLegacy>> for SignedTransaction {
    fn from(signed: Signed<TxLegacy>) -> Self {
        let hash = *signed.hash();
        let nonce = signed.tx().nonce;
        let raw = TxEnvelope::Legacy(signed).encoded_2718();
        Self {
            hash,
            raw: raw.into(),
            nonce,
        }
    }
}

/// Worst-case gas cost of an envelope in wei.
pub fn max_gas_cost(gas_limit: u64, gas_price: u128) -> U256 {
    U256::from(gas_limit) * U256::from(gas_price)
}
