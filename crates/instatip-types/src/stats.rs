//! Aggregate tip statistics (derived, never stored)

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Number of recipients reported in [`Statistics::top_recipients`]
pub const TOP_RECIPIENT_LIMIT: usize = 5;

/// Cumulative tips received by one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSummary {
    pub address: String,
    pub amount: Amount,
    pub count: u64,
}

/// Tip statistics for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_tips: usize,
    pub total_amount: Amount,
    /// `total_amount / total_tips`, zero when there are no tips
    pub average_tip: Amount,
    /// Highest cumulative amount first; ties keep first-seen order
    pub top_recipients: Vec<RecipientSummary>,
}
