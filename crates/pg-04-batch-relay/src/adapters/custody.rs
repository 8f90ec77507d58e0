//! In-Memory Custody Ledger
//!
//! Implements `CustodyLedger` with per-asset balances held in memory and a
//! log of every outbound transfer. Used by tests and local tooling.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::{Address, AssetId, TransferInstruction};
use tracing::{debug, info};

use crate::ports::outbound::{CustodyError, CustodyLedger};

/// An outbound transfer the ledger has executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutboundTransfer {
    pub asset: AssetId,
    pub destination: Address,
    pub amount: u128,
}

#[derive(Default)]
struct LedgerInner {
    balances: HashMap<AssetId, u128>,
    outbound: Vec<OutboundTransfer>,
    rejecting: bool,
}

/// In-memory custody ledger.
#[derive(Default)]
pub struct InMemoryCustodyLedger {
    inner: RwLock<LedgerInner>,
}

impl InMemoryCustodyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-funded with `amount` of `asset`.
    pub fn funded(asset: AssetId, amount: u128) -> Self {
        let ledger = Self::new();
        ledger.inner.write().balances.insert(asset, amount);
        ledger
    }

    /// Custody balance of `asset`.
    pub fn balance(&self, asset: &AssetId) -> u128 {
        self.inner.read().balances.get(asset).copied().unwrap_or(0)
    }

    /// Every outbound transfer executed so far, in order.
    pub fn outbound(&self) -> Vec<OutboundTransfer> {
        self.inner.read().outbound.clone()
    }

    /// Make every subsequent request fail, simulating an unavailable ledger.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.inner.write().rejecting = rejecting;
    }
}

impl CustodyLedger for InMemoryCustodyLedger {
    fn lock_in(&self, asset: &AssetId, source: &Address, amount: u128) -> Result<(), CustodyError> {
        let mut inner = self.inner.write();
        if inner.rejecting {
            return Err(CustodyError::Rejected("ledger unavailable".into()));
        }

        let balance = inner.balances.entry(*asset).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { asset: *asset })?;

        debug!(
            "[pg-04] Locked {} of 0x{} from 0x{}",
            amount,
            hex::encode(asset),
            hex::encode(source)
        );
        Ok(())
    }

    fn transfer_out(
        &self,
        asset: &AssetId,
        transfers: &[TransferInstruction],
    ) -> Result<(), CustodyError> {
        let mut inner = self.inner.write();
        if inner.rejecting {
            return Err(CustodyError::Rejected("ledger unavailable".into()));
        }

        // Check the whole batch before moving anything.
        let required = transfers
            .iter()
            .try_fold(0u128, |sum, t| sum.checked_add(t.amount))
            .ok_or(CustodyError::Overflow { asset: *asset })?;
        let available = inner.balances.get(asset).copied().unwrap_or(0);
        if available < required {
            return Err(CustodyError::InsufficientBalance {
                asset: *asset,
                available,
                required,
            });
        }

        inner.balances.insert(*asset, available - required);
        inner
            .outbound
            .extend(transfers.iter().map(|t| OutboundTransfer {
                asset: *asset,
                destination: t.destination,
                amount: t.amount,
            }));

        info!(
            "[pg-04] Released {} transfers totalling {} of 0x{}",
            transfers.len(),
            required,
            hex::encode(asset)
        );
        Ok(())
    }
}
