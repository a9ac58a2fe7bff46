//! Settlement receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, SessionId, SettlementRef};

/// Proof that a session was reconciled against the external network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub session_id: SessionId,
    pub settlement_ref: SettlementRef,
    /// Transactions plus tips stamped with `settlement_ref`
    pub settled_entries: usize,
    pub settled_amount: Amount,
    pub settled_at: DateTime<Utc>,
}
