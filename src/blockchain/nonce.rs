//! Per-address nonce allocation.
//!
//! # Ordering
//! Each address owns a slot guarded by a FIFO async mutex. Holding a
//! [`NonceLease`] excludes every other submission for that address, so the
//! order nonces are issued in is the order they reach the node. Slots for
//! different addresses are independent.
//!
//! The first allocation for an address seeds the slot from the node's
//! pending nonce; later allocations increment locally.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::blockchain::client::RemoteLedger;
use crate::blockchain::types::BlockchainResult;

type Slot = Arc<Mutex<Option<u64>>>;

/// Hands out strictly increasing nonces per address.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    slots: DashMap<Address, Slot>,
}

impl NonceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive ownership of `address`'s nonce sequence.
    ///
    /// Waiters are served in arrival order.
    pub async fn lease(&self, address: Address) -> NonceLease {
        let slot = Arc::clone(self.slots.entry(address).or_default().value());
        NonceLease {
            address,
            guard: slot.lock_owned().await,
        }
    }

    /// Allocate a single nonce for `address`.
    pub async fn next<L: RemoteLedger>(&self, address: Address, ledger: &L) -> BlockchainResult<u64> {
        self.lease(address).await.next(ledger).await
    }

    /// The next nonce that would be issued locally, if the address has been seen.
    pub fn peek(&self, address: &Address) -> Option<u64> {
        let slot = Arc::clone(self.slots.get(address)?.value());
        let current = slot.try_lock().ok().and_then(|guard| *guard);
        current
    }
}

/// Exclusive access to one address's nonce sequence.
///
/// Dropping the lease releases the address to the next waiter.
#[derive(Debug)]
pub struct NonceLease {
    address: Address,
    guard: OwnedMutexGuard<Option<u64>>,
}

impl NonceLease {
    pub fn address(&self) -> Address {
        self.address
    }

    /// Issue the next nonce.
    ///
    /// A failed seed query leaves the slot unseeded so the next call retries it.
    pub async fn next<L: RemoteLedger>(&mut self, ledger: &L) -> BlockchainResult<u64> {
        let nonce = match *self.guard {
            Some(next) => next,
            None => {
                let pending = ledger.get_pending_nonce(self.address).await?;
                tracing::debug!(address = %self.address, pending, "Seeded nonce from node");
                pending
            }
        };
        *self.guard = Some(nonce + 1);
        Ok(nonce)
    }
}
