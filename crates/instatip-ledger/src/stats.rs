//! Statistics aggregator
//!
//! Statistics are recomputed from the tip sequence on every call so they can
//! never drift from the ledger. Transactions are not counted.

use std::collections::HashMap;

use instatip_types::{Amount, RecipientSummary, Statistics, Tip, TOP_RECIPIENT_LIMIT};

/// Compute count, total, average and top recipients over `tips`.
///
/// Recipients are grouped by exact string match on the address.
pub fn compute_stats(tips: &[Tip]) -> Statistics {
    let total_tips = tips.len();
    let total_amount: Amount = tips.iter().map(|tip| &tip.amount).sum();
    let average_tip = total_amount.split(total_tips);

    // Vec keeps first-seen order; the map only indexes into it
    let mut recipients: Vec<RecipientSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for tip in tips {
        match index.get(tip.to.as_str()) {
            Some(&i) => {
                let summary = &mut recipients[i];
                summary.amount = summary.amount + tip.amount;
                summary.count += 1;
            }
            None => {
                index.insert(tip.to.as_str(), recipients.len());
                recipients.push(RecipientSummary {
                    address: tip.to.clone(),
                    amount: tip.amount,
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable: equal totals stay in first-seen order
    recipients.sort_by(|a, b| b.amount.cmp(&a.amount));
    recipients.truncate(TOP_RECIPIENT_LIMIT);

    Statistics {
        total_tips,
        total_amount,
        average_tip,
        top_recipients: recipients,
    }
}
