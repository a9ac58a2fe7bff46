//! The bounded-allowance session entity
//!
//! A session owns the authoritative overspend check: nothing may be admitted
//! that would push `spent` past `allowance`, and a rejected admission leaves
//! the session untouched.
//!
//! # Invariants
//!
//! 1. `0 <= spent <= allowance` at all times
//! 2. `spent` and `transaction_count` never decrease
//! 3. Status only moves active → ended → settled or active → settled
//! 4. `ended_at` is written at most once

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{Amount, InstaTipError, Result, SessionId};

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Transfers are admissible
    Active,
    /// Closed by the owner, awaiting settlement
    Ended,
    /// Reconciled against the external settlement network (terminal)
    Settled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

/// A bounded-spending session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    owner: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    allowance: Amount,
    spent: Amount,
    transaction_count: u64,
    status: SessionStatus,
}

impl Session {
    /// Open a new active session for `owner` bounded by `allowance`
    pub fn open(owner: impl Into<String>, allowance: Amount) -> Result<Self> {
        let owner = owner.into();
        if owner.trim().is_empty() {
            return Err(InstaTipError::InvalidOwner);
        }
        if allowance.is_negative() {
            return Err(InstaTipError::InvalidAllowance {
                requested: allowance,
                reason: "must not be negative".to_string(),
            });
        }

        Ok(Self {
            id: SessionId::new(),
            owner,
            started_at: Utc::now(),
            ended_at: None,
            allowance,
            spent: Amount::zero(),
            transaction_count: 0,
            status: SessionStatus::Active,
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn allowance(&self) -> Amount {
        self.allowance
    }

    pub fn spent(&self) -> Amount {
        self.spent
    }

    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Allowance still available for spending
    pub fn remaining(&self) -> Amount {
        self.allowance
            .checked_sub(self.spent)
            .unwrap_or_default()
    }

    /// Wall-clock length of the session, once it has ended
    pub fn duration(&self) -> Option<Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    /// Whole minutes between start and end; zero while the session is open
    pub fn duration_minutes(&self) -> i64 {
        self.duration().map(|d| d.num_minutes()).unwrap_or(0)
    }

    /// Check whether `amount` could be admitted, without mutating anything
    pub fn check_admission(&self, amount: Amount) -> Result<()> {
        if !self.is_active() {
            return Err(InstaTipError::NoActiveSession);
        }
        if !amount.is_positive() {
            return Err(InstaTipError::invalid_amount(format!(
                "{amount} must be greater than zero"
            )));
        }

        let after = self
            .spent
            .checked_add(amount)
            .ok_or_else(|| InstaTipError::invalid_amount("amount overflow"))?;
        if after > self.allowance {
            return Err(InstaTipError::AllowanceExceeded {
                requested: amount,
                spent: self.spent,
                allowance: self.allowance,
            });
        }
        Ok(())
    }

    /// Admit a transfer of `amount`: all-or-nothing
    pub fn admit(&mut self, amount: Amount) -> Result<()> {
        self.check_admission(amount)?;
        self.spent = self.spent + amount;
        self.transaction_count += 1;
        Ok(())
    }

    /// Close the session. Ended or settled sessions are left as they are.
    pub fn close(&mut self, at: DateTime<Utc>) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        self.status = SessionStatus::Ended;
        self.ended_at.get_or_insert(at);
        true
    }

    /// Move to the terminal settled state
    pub fn mark_settled(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(InstaTipError::AlreadySettled {
                session_id: self.id.to_string(),
            });
        }
        self.status = SessionStatus::Settled;
        self.ended_at.get_or_insert(at);
        Ok(())
    }
}
