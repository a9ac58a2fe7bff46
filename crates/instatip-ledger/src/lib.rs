//! InstaTip Ledger - Append-only record of a session's transfers
//!
//! The ledger is:
//! - Session-scoped (cleared when a new session replaces the old one)
//! - Split in two independent sequences: transactions and tips
//! - Append-only (entries are never removed or reordered)
//! - Settlement-stamped (the only mutation after append)
//!
//! The store itself is plain data. Callers that share it across tasks wrap
//! it in a lock together with the session it belongs to, so that an append
//! and the matching allowance update are observed as one step.

use instatip_types::{Amount, SettlementRef, Tip, TipId, Transaction, TransactionId};
use tracing::debug;

pub mod stats;

pub use stats::compute_stats;

/// Read-only copy of both ledger sequences, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub transactions: Vec<Transaction>,
    pub tips: Vec<Tip>,
}

impl LedgerSnapshot {
    pub fn len(&self) -> usize {
        self.transactions.len() + self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The InstaTip ledger store
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    transactions: Vec<Transaction>,
    tips: Vec<Tip>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_transaction(&mut self, transaction: Transaction) {
        debug!(id = %transaction.id, amount = %transaction.amount, "ledger append transaction");
        self.transactions.push(transaction);
    }

    pub fn append_tip(&mut self, tip: Tip) {
        debug!(id = %tip.id, amount = %tip.amount, "ledger append tip");
        self.tips.push(tip);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    pub fn tip(&self, id: &TipId) -> Option<&Tip> {
        self.tips.iter().find(|tip| &tip.id == id)
    }

    /// Total number of entries across both sequences
    pub fn len(&self) -> usize {
        self.transactions.len() + self.tips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries not yet stamped by a settlement
    pub fn unsettled_count(&self) -> usize {
        self.transactions.iter().filter(|tx| !tx.is_settled()).count()
            + self.tips.iter().filter(|tip| !tip.is_settled()).count()
    }

    /// Sum of every amount in both sequences
    pub fn total_amount(&self) -> Amount {
        let transactions: Amount = self.transactions.iter().map(|tx| &tx.amount).sum();
        let tips: Amount = self.tips.iter().map(|tip| &tip.amount).sum();
        transactions + tips
    }

    /// Stamp every entry with `reference`. Returns the number of entries marked.
    pub fn mark_settled(&mut self, reference: &SettlementRef) -> usize {
        for tx in &mut self.transactions {
            tx.settle(reference);
        }
        for tip in &mut self.tips {
            tip.settle(reference);
        }
        self.len()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            transactions: self.transactions.clone(),
            tips: self.tips.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.tips.clear();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{tip, transaction};
    use super::*;
    use instatip_types::TipStatus;

    #[test]
    fn test_append_preserves_order() {
        let mut ledger = LedgerStore::new();
        let first = tip("0xa", Amount::from(1));
        let second = tip("0xb", Amount::from(2));
        ledger.append_tip(first.clone());
        ledger.append_tip(second.clone());

        assert_eq!(ledger.tips(), &[first, second]);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_sequences_are_independent() {
        let mut ledger = LedgerStore::new();
        ledger.append_transaction(transaction("0xa", Amount::from(5)));
        ledger.append_tip(tip("0xb", Amount::from(2)));

        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.tips().len(), 1);
        assert_eq!(ledger.total_amount(), Amount::from(7));
    }

    #[test]
    fn test_lookup_by_id() {
        let mut ledger = LedgerStore::new();
        let t = tip("0xa", Amount::from(1));
        let id = t.id.clone();
        ledger.append_tip(t);

        assert!(ledger.tip(&id).is_some());
        assert!(ledger.tip(&TipId::new()).is_none());
    }

    #[test]
    fn test_mark_settled_stamps_everything() {
        let mut ledger = LedgerStore::new();
        ledger.append_transaction(transaction("0xa", Amount::from(5)));
        ledger.append_tip(tip("0xb", Amount::from(2)));
        assert_eq!(ledger.unsettled_count(), 2);

        let reference = SettlementRef::new("0x01");
        assert_eq!(ledger.mark_settled(&reference), 2);
        assert_eq!(ledger.unsettled_count(), 0);
        assert_eq!(ledger.tips()[0].status, TipStatus::Received);
        assert_eq!(ledger.transactions()[0].hash.as_deref(), Some("0x01"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ledger = LedgerStore::new();
        ledger.append_tip(tip("0xa", Amount::from(1)));
        let snapshot = ledger.snapshot();
        ledger.clear();

        assert_eq!(snapshot.len(), 1);
        assert!(ledger.is_empty());
    }
}
