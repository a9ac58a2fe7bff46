//! The external settlement collaborator
//!
//! A gateway takes a locked session and returns an opaque reference from
//! the network it settles on. It is the single suspension point of the
//! core; timeouts are the caller's policy, not the gateway's.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use instatip_types::{Amount, SessionId, SettlementRef};
use rand::RngCore;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Failure reported by a settlement gateway
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The network refused the settlement
    #[error("settlement rejected: {0}")]
    Rejected(String),

    /// The network could not be reached
    #[error("settlement network unavailable: {0}")]
    Unavailable(String),
}

/// What the gateway is asked to settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementRequest {
    pub session_id: SessionId,
    pub owner: String,
    pub entry_count: usize,
    pub total: Amount,
}

#[async_trait::async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Submit one session for settlement. Single shot, no partial results.
    async fn submit(&self, request: &SettlementRequest) -> Result<SettlementRef, GatewayError>;
}

/// A settlement the in-memory gateway accepted
#[derive(Debug, Clone)]
pub struct SettledSession {
    pub request: SettlementRequest,
    pub reference: SettlementRef,
    pub settled_at: DateTime<Utc>,
}

/// Gateway that settles in process and issues random `0x…` hashes
pub struct InMemoryGateway {
    settlements: Arc<RwLock<HashMap<SettlementRef, SettledSession>>>,
    failures_pending: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            settlements: Arc::new(RwLock::new(HashMap::new())),
            failures_pending: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` submissions fail with `Unavailable`
    pub fn fail_next(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    pub async fn get(&self, reference: &SettlementRef) -> Option<SettledSession> {
        self.settlements.read().await.get(reference).cloned()
    }

    pub async fn settlement_count(&self) -> usize {
        self.settlements.read().await.len()
    }

    fn take_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SettlementGateway for InMemoryGateway {
    async fn submit(&self, request: &SettlementRequest) -> Result<SettlementRef, GatewayError> {
        if self.take_failure() {
            warn!(session_id = %request.session_id, "in-memory gateway failing on request");
            return Err(GatewayError::Unavailable("injected failure".to_string()));
        }

        let mut hash = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut hash);
        let reference = SettlementRef::new(format!("0x{}", hex::encode(hash)));

        self.settlements.write().await.insert(
            reference.clone(),
            SettledSession {
                request: request.clone(),
                reference: reference.clone(),
                settled_at: Utc::now(),
            },
        );

        info!(
            session_id = %request.session_id,
            total = %request.total,
            reference = %reference,
            "settlement accepted"
        );
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SettlementRequest {
        SettlementRequest {
            session_id: SessionId::new(),
            owner: "0xowner".to_string(),
            entry_count: 2,
            total: Amount::from(45),
        }
    }

    #[tokio::test]
    async fn test_reference_is_hex_hash() {
        let gateway = InMemoryGateway::new();
        let reference = gateway.submit(&request()).await.unwrap();

        let hex_part = reference.as_str().strip_prefix("0x").unwrap();
        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(gateway.get(&reference).await.is_some());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(2);

        assert!(matches!(
            gateway.submit(&request()).await,
            Err(GatewayError::Unavailable(_))
        ));
        assert!(gateway.submit(&request()).await.is_err());
        assert!(gateway.submit(&request()).await.is_ok());
        assert_eq!(gateway.settlement_count().await, 1);
    }
}
