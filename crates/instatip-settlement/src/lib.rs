//! InstaTip Settlement - reconcile a session against the external network
//!
//! Settlement is the one finalizing transition of a session:
//!
//! ```text
//! lock session → submit to gateway → stamp ledger + mark settled
//! ```
//!
//! Admission stays locked out for the whole exchange while reads keep
//! working. If the gateway fails (or the future is dropped, e.g. by a
//! caller's timeout) nothing has been mutated and the session can be
//! settled again later.

use std::sync::Arc;

use instatip_session::SessionManager;
use instatip_types::{InstaTipError, Result, SessionId, SettlementReceipt};
use tokio::sync::RwLock;
use tracing::{info, warn};

pub mod gateway;

pub use gateway::{
    GatewayError, InMemoryGateway, SettledSession, SettlementGateway, SettlementRequest,
};

/// Drives settlement of one manager's sessions through a gateway
pub struct SettlementCoordinator {
    manager: SessionManager,
    gateway: Arc<dyn SettlementGateway>,
    receipts: Arc<RwLock<Vec<SettlementReceipt>>>,
}

impl SettlementCoordinator {
    pub fn new(manager: SessionManager, gateway: Arc<dyn SettlementGateway>) -> Self {
        Self {
            manager,
            gateway,
            receipts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Settle `session_id`.
    ///
    /// Fails with `UnknownSession` or `AlreadySettled` before contacting the
    /// gateway, and with the retriable `SettlementFailed` if the gateway
    /// reports an error.
    pub async fn settle(&self, session_id: &SessionId) -> Result<SettlementReceipt> {
        let guard = self.manager.begin_settlement(session_id).await?;
        let request = SettlementRequest {
            session_id: guard.session_id().clone(),
            owner: guard.owner().to_string(),
            entry_count: guard.entry_count(),
            total: guard.total(),
        };

        info!(
            session_id = %session_id,
            entries = request.entry_count,
            total = %request.total,
            "submitting settlement"
        );

        let reference = match self.gateway.submit(&request).await {
            Ok(reference) => reference,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "settlement failed");
                return Err(InstaTipError::SettlementFailed {
                    session_id: session_id.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let receipt = guard.commit(reference).await?;
        self.receipts.write().await.push(receipt.clone());
        Ok(receipt)
    }

    /// Every receipt issued by this coordinator, oldest first
    pub async fn receipts(&self) -> Vec<SettlementReceipt> {
        self.receipts.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instatip_types::{Amount, SessionStatus};

    const OWNER: &str = "0xowner";

    fn coordinator() -> (SettlementCoordinator, Arc<InMemoryGateway>) {
        let gateway = Arc::new(InMemoryGateway::new());
        let coordinator = SettlementCoordinator::new(SessionManager::default(), gateway.clone());
        (coordinator, gateway)
    }

    #[tokio::test]
    async fn test_settle_unknown_session() {
        let (coordinator, gateway) = coordinator();
        coordinator.manager().open_session(OWNER).await.unwrap();

        let err = coordinator.settle(&SessionId::new()).await.unwrap_err();
        assert!(matches!(err, InstaTipError::UnknownSession { .. }));
        assert_eq!(gateway.settlement_count().await, 0);
    }

    #[tokio::test]
    async fn test_settle_without_any_session() {
        let (coordinator, _) = coordinator();
        let err = coordinator.settle(&SessionId::new()).await.unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SESSION");
    }

    #[tokio::test]
    async fn test_settle_records_receipt() {
        let (coordinator, gateway) = coordinator();
        let session = coordinator.manager().open_session(OWNER).await.unwrap();
        coordinator
            .manager()
            .record_tip(OWNER, "0xcreator", Amount::from(3), None)
            .await
            .unwrap();

        let receipt = coordinator.settle(session.id()).await.unwrap();
        assert_eq!(receipt.settled_entries, 1);
        assert_eq!(coordinator.receipts().await, vec![receipt.clone()]);

        let settled = gateway.get(&receipt.settlement_ref).await.unwrap();
        assert_eq!(settled.request.total, Amount::from(3));
        assert_eq!(settled.request.owner, OWNER);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_retriable_and_leaves_session_active() {
        let (coordinator, gateway) = coordinator();
        let session = coordinator.manager().open_session(OWNER).await.unwrap();
        gateway.fail_next(1);

        let err = coordinator.settle(session.id()).await.unwrap_err();
        assert!(err.is_retriable());
        let current = coordinator.manager().current_session().await.unwrap();
        assert_eq!(current.status(), SessionStatus::Active);
        assert!(coordinator.receipts().await.is_empty());

        let receipt = coordinator.settle(session.id()).await.unwrap();
        assert_eq!(&receipt.session_id, session.id());
    }
}
