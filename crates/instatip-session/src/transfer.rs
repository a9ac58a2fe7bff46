//! Transfer requests
//!
//! The metadata carried by each entry kind is a closed set of fields, so
//! nothing unvalidated rides along into the ledger.

use instatip_types::Amount;

/// Kind-specific fields of a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferDetails {
    /// A generic off-chain transfer
    Transaction {
        /// Falls back to the configured default token
        token: Option<String>,
        memo: Option<String>,
    },
    /// A tip to a creator
    Tip {
        message: Option<String>,
        content_ref: Option<String>,
    },
}

/// A request to move `amount` from `from` to `to` inside the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub details: TransferDetails,
}

impl TransferRequest {
    pub fn tip(from: impl Into<String>, to: impl Into<String>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            details: TransferDetails::Tip {
                message: None,
                content_ref: None,
            },
        }
    }

    pub fn transaction(from: impl Into<String>, to: impl Into<String>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            details: TransferDetails::Transaction {
                token: None,
                memo: None,
            },
        }
    }

    /// Attach a message (tips only; ignored for transactions)
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        if let TransferDetails::Tip { message, .. } = &mut self.details {
            *message = Some(text.into());
        }
        self
    }

    /// Reference the tipped content (tips only)
    pub fn with_content_ref(mut self, reference: impl Into<String>) -> Self {
        if let TransferDetails::Tip { content_ref, .. } = &mut self.details {
            *content_ref = Some(reference.into());
        }
        self
    }

    /// Set the token label (transactions only)
    pub fn with_token(mut self, label: impl Into<String>) -> Self {
        if let TransferDetails::Transaction { token, .. } = &mut self.details {
            *token = Some(label.into());
        }
        self
    }

    /// Attach a memo (transactions only)
    pub fn with_memo(mut self, text: impl Into<String>) -> Self {
        if let TransferDetails::Transaction { memo, .. } = &mut self.details {
            *memo = Some(text.into());
        }
        self
    }

    pub fn is_tip(&self) -> bool {
        matches!(self.details, TransferDetails::Tip { .. })
    }
}
