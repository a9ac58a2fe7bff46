//! Ledger entry types
//!
//! Two independent append-only sequences are kept per session: generic
//! transfers ([`Transaction`]) and social payments ([`Tip`]). Entries are
//! immutable once recorded except for the settlement fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, SessionId, SettlementRef, TipId, TransactionId};

/// Where a transaction is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferKind {
    OffChain,
    OnChain,
}

/// Confirmation status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Delivery status of a tip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipStatus {
    Pending,
    /// Admitted off-chain
    Sent,
    /// Reconciled on settlement
    Received,
}

/// A generic off-chain transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub session_id: SessionId,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    /// Denomination label, e.g. "USDC"
    pub token: String,
    pub memo: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: TransferKind,
    pub status: TransactionStatus,
    /// External transaction hash, attached at settlement
    pub hash: Option<String>,
    pub settlement: Option<SettlementRef>,
}

impl Transaction {
    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// Stamp the entry with an external settlement reference
    pub fn settle(&mut self, reference: &SettlementRef) {
        self.hash = Some(reference.as_str().to_string());
        self.settlement = Some(reference.clone());
    }
}

/// A tip to a creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub id: TipId,
    pub session_id: SessionId,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub message: Option<String>,
    /// The piece of content that was tipped, if any
    pub content_ref: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: TipStatus,
    pub settlement: Option<SettlementRef>,
}

impl Tip {
    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// Stamp the entry with an external settlement reference
    pub fn settle(&mut self, reference: &SettlementRef) {
        self.status = TipStatus::Received;
        self.settlement = Some(reference.clone());
    }
}

/// An admitted transfer, as returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEntry {
    Transaction(Transaction),
    Tip(Tip),
}

impl LedgerEntry {
    pub fn amount(&self) -> Amount {
        match self {
            Self::Transaction(tx) => tx.amount,
            Self::Tip(tip) => tip.amount,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Transaction(tx) => &tx.to,
            Self::Tip(tip) => &tip.to,
        }
    }

    pub fn id(&self) -> String {
        match self {
            Self::Transaction(tx) => tx.id.to_string(),
            Self::Tip(tip) => tip.id.to_string(),
        }
    }

    pub fn is_settled(&self) -> bool {
        match self {
            Self::Transaction(tx) => tx.is_settled(),
            Self::Tip(tip) => tip.is_settled(),
        }
    }

    /// Stamp the entry with an external settlement reference
    pub fn settle(&mut self, reference: &SettlementRef) {
        match self {
            Self::Transaction(tx) => tx.settle(reference),
            Self::Tip(tip) => tip.settle(reference),
        }
    }
}
