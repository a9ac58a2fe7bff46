//! Session manager
//!
//! One manager per connected identity. It owns the current session and its
//! ledger behind a single lock, so admission (allowance check, ledger append,
//! counter update) is observed by readers as one step.
//!
//! A second lock, the settlement gate, orders writers against an in-flight
//! settlement. Admission, open and clear take the gate; readers and close do
//! not, so queries keep answering while the settlement network is slow.

use std::sync::Arc;

use chrono::Utc;
use instatip_ledger::{compute_stats, LedgerSnapshot, LedgerStore};
use instatip_types::{
    Amount, InstaTipError, LedgerEntry, Result, Session, SessionId, SettlementReceipt,
    SettlementRef, Statistics, Tip, TipId, TipStatus, Transaction, TransactionId,
    TransactionStatus, TransferKind,
};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::{SessionConfig, TransferDetails, TransferRequest};

/// Current session plus the ledger that belongs to it
#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    ledger: LedgerStore,
}

/// Handle to one identity's session and ledger. Cloning shares the state.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    state: Arc<RwLock<SessionState>>,
    settle_gate: Arc<Mutex<()>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(SessionState::default())),
            settle_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open a session with the configured default allowance
    pub async fn open_session(&self, owner: &str) -> Result<Session> {
        self.open_session_with_allowance(owner, None).await
    }

    /// Open a session, replacing any current one and its ledger
    pub async fn open_session_with_allowance(
        &self,
        owner: &str,
        allowance: Option<Amount>,
    ) -> Result<Session> {
        if owner.trim().is_empty() {
            return Err(InstaTipError::InvalidOwner);
        }
        let allowance = self.config.resolve_allowance(allowance)?;
        let session = Session::open(owner, allowance)?;

        let _gate = self.settle_gate.lock().await;
        let mut state = self.state.write().await;
        if let Some(previous) = state.session.as_ref() {
            let unsettled = state.ledger.unsettled_count();
            if unsettled > 0 {
                warn!(
                    session_id = %previous.id(),
                    unsettled,
                    "replacing session with unsettled entries"
                );
            }
        }
        state.ledger.clear();
        state.session = Some(session.clone());

        info!(session_id = %session.id(), owner, allowance = %allowance, "session opened");
        Ok(session)
    }

    /// End the current session. `None` when no session exists.
    pub async fn close_session(&self) -> Option<Session> {
        let mut state = self.state.write().await;
        let session = state.session.as_mut()?;
        if session.close(Utc::now()) {
            info!(
                session_id = %session.id(),
                spent = %session.spent(),
                transactions = session.transaction_count(),
                "session closed"
            );
        }
        Some(session.clone())
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    pub async fn is_session_active(&self) -> bool {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .is_some_and(Session::is_active)
    }

    /// Admit a transfer against the current session's allowance.
    ///
    /// Either the session counters move and the entry is appended, or
    /// nothing changes and the error is returned.
    pub async fn record_transfer(&self, request: TransferRequest) -> Result<LedgerEntry> {
        let TransferRequest {
            from,
            to,
            amount,
            details,
        } = request;
        let default_token = &self.config.default_token;

        match details {
            TransferDetails::Tip {
                message,
                content_ref,
            } => {
                self.admit(amount, |session, ledger| {
                    let tip = new_tip(session, from, to, amount, message, content_ref);
                    ledger.append_tip(tip.clone());
                    LedgerEntry::Tip(tip)
                })
                .await
            }
            TransferDetails::Transaction { token, memo } => {
                let token = token.unwrap_or_else(|| default_token.clone());
                self.admit(amount, |session, ledger| {
                    let tx = new_transaction(session, from, to, amount, token, memo);
                    ledger.append_transaction(tx.clone());
                    LedgerEntry::Transaction(tx)
                })
                .await
            }
        }
    }

    /// Record a tip
    pub async fn record_tip(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
        message: Option<String>,
    ) -> Result<Tip> {
        self.admit(amount, |session, ledger| {
            let tip = new_tip(session, from.to_string(), to.to_string(), amount, message, None);
            ledger.append_tip(tip.clone());
            tip
        })
        .await
    }

    /// Record a generic transaction; `token` defaults to the configured token
    pub async fn record_transaction(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
        token: Option<&str>,
    ) -> Result<Transaction> {
        let token = token.unwrap_or(self.config.default_token.as_str()).to_string();
        self.admit(amount, |session, ledger| {
            let tx =
                new_transaction(session, from.to_string(), to.to_string(), amount, token, None);
            ledger.append_transaction(tx.clone());
            tx
        })
        .await
    }

    async fn admit<T>(
        &self,
        amount: Amount,
        append: impl FnOnce(&Session, &mut LedgerStore) -> T,
    ) -> Result<T> {
        let _gate = self.settle_gate.lock().await;
        let mut state = self.state.write().await;
        let SessionState { session, ledger } = &mut *state;
        let session = session.as_mut().ok_or(InstaTipError::NoActiveSession)?;

        if let Err(e) = session.admit(amount) {
            warn!(session_id = %session.id(), amount = %amount, error = %e, "transfer rejected");
            return Err(e);
        }
        debug!(
            session_id = %session.id(),
            amount = %amount,
            spent = %session.spent(),
            remaining = %session.remaining(),
            "transfer admitted"
        );
        Ok(append(session, ledger))
    }

    /// Both ledger sequences, in insertion order
    pub async fn ledger(&self) -> LedgerSnapshot {
        self.state.read().await.ledger.snapshot()
    }

    pub async fn transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.state
            .read()
            .await
            .ledger
            .transaction(id)
            .cloned()
            .ok_or_else(|| InstaTipError::not_found("transaction", id))
    }

    pub async fn tip(&self, id: &TipId) -> Result<Tip> {
        self.state
            .read()
            .await
            .ledger
            .tip(id)
            .cloned()
            .ok_or_else(|| InstaTipError::not_found("tip", id))
    }

    /// Tip statistics, recomputed from the ledger
    pub async fn stats(&self) -> Statistics {
        compute_stats(self.state.read().await.ledger.tips())
    }

    /// Drop the session and both ledgers
    pub async fn clear(&self) {
        let _gate = self.settle_gate.lock().await;
        let mut state = self.state.write().await;
        if let Some(session) = state.session.take() {
            info!(session_id = %session.id(), "session cleared");
        }
        state.ledger.clear();
    }

    /// Reserve the session for settlement.
    ///
    /// The returned guard holds the settlement gate until it is committed or
    /// dropped, so no transfer can be admitted while the external settlement
    /// call is in flight. Readers are not blocked. Dropping the guard without
    /// committing leaves the session exactly as it was.
    pub async fn begin_settlement(&self, session_id: &SessionId) -> Result<SettlementGuard> {
        let gate = self.settle_gate.clone().lock_owned().await;
        let state = self.state.read().await;

        let (owner, status) = match state.session.as_ref() {
            Some(session) if session.id() == session_id => {
                (session.owner().to_string(), session.status())
            }
            _ => {
                return Err(InstaTipError::UnknownSession {
                    session_id: session_id.to_string(),
                })
            }
        };
        if status.is_terminal() {
            return Err(InstaTipError::AlreadySettled {
                session_id: session_id.to_string(),
            });
        }

        let entry_count = state.ledger.len();
        let total = state.ledger.total_amount();
        debug!(session_id = %session_id, entry_count, total = %total, "settlement started");

        Ok(SettlementGuard {
            _gate: gate,
            state: self.state.clone(),
            session_id: session_id.clone(),
            owner,
            entry_count,
            total,
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Exclusive hold on a session that is being settled
pub struct SettlementGuard {
    _gate: OwnedMutexGuard<()>,
    state: Arc<RwLock<SessionState>>,
    session_id: SessionId,
    owner: String,
    entry_count: usize,
    total: Amount,
}

impl SettlementGuard {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Entries that will be stamped on commit
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Sum of all ledger amounts being settled
    pub fn total(&self) -> Amount {
        self.total
    }

    /// Finalize: mark the session settled and stamp every entry with `reference`
    pub async fn commit(self, reference: SettlementRef) -> Result<SettlementReceipt> {
        let settled_at = Utc::now();
        let mut state = self.state.write().await;
        let SessionState { session, ledger } = &mut *state;
        let session = session
            .as_mut()
            .filter(|session| session.id() == &self.session_id)
            .ok_or_else(|| InstaTipError::UnknownSession {
                session_id: self.session_id.to_string(),
            })?;

        session.mark_settled(settled_at)?;
        let settled_entries = ledger.mark_settled(&reference);

        info!(
            session_id = %self.session_id,
            settlement_ref = %reference,
            settled_entries,
            "session settled"
        );

        Ok(SettlementReceipt {
            session_id: self.session_id.clone(),
            settlement_ref: reference,
            settled_entries,
            settled_amount: self.total,
            settled_at,
        })
    }
}

fn new_tip(
    session: &Session,
    from: String,
    to: String,
    amount: Amount,
    message: Option<String>,
    content_ref: Option<String>,
) -> Tip {
    Tip {
        id: TipId::new(),
        session_id: session.id().clone(),
        from,
        to,
        amount,
        message,
        content_ref,
        timestamp: Utc::now(),
        status: TipStatus::Sent,
        settlement: None,
    }
}

fn new_transaction(
    session: &Session,
    from: String,
    to: String,
    amount: Amount,
    token: String,
    memo: Option<String>,
) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        session_id: session.id().clone(),
        from,
        to,
        amount,
        token,
        memo,
        timestamp: Utc::now(),
        kind: TransferKind::OffChain,
        status: TransactionStatus::Confirmed,
        hash: None,
        settlement: None,
    }
}
