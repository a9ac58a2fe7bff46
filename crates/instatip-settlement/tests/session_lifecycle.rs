use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use instatip_session::{SessionManager, TransferRequest};
use instatip_settlement::{
    GatewayError, InMemoryGateway, SettlementCoordinator, SettlementGateway, SettlementRequest,
};
use instatip_types::{
    Amount, InstaTipError, SessionStatus, SettlementRef, Statistics, TipStatus,
};
use rust_decimal_macros::dec;

const FAN: &str = "0xfan";

/// Gateway that never answers, standing in for a hung network call
struct StalledGateway;

/// Gateway that answers after a fixed delay
struct SlowGateway(Duration);

#[async_trait]
impl SettlementGateway for SlowGateway {
    async fn submit(&self, request: &SettlementRequest) -> Result<SettlementRef, GatewayError> {
        tokio::time::sleep(self.0).await;
        Ok(SettlementRef::new(format!("0xslow{}", request.entry_count)))
    }
}

#[async_trait]
impl SettlementGateway for StalledGateway {
    async fn submit(&self, _request: &SettlementRequest) -> Result<SettlementRef, GatewayError> {
        std::future::pending().await
    }
}

fn setup() -> SettlementCoordinator {
    SettlementCoordinator::new(SessionManager::default(), Arc::new(InMemoryGateway::new()))
}

#[tokio::test]
async fn tip_session_end_to_end() {
    let coordinator = setup();
    let manager = coordinator.manager();
    let session = manager
        .open_session_with_allowance(FAN, Some(Amount::from(50)))
        .await
        .unwrap();

    manager.record_tip(FAN, "0xalice", Amount::from(20), None).await.unwrap();
    let current = manager.current_session().await.unwrap();
    assert_eq!(current.spent(), Amount::from(20));
    assert_eq!(current.transaction_count(), 1);

    let err = manager
        .record_tip(FAN, "0xbob", Amount::from(40), None)
        .await
        .unwrap_err();
    assert!(matches!(err, InstaTipError::AllowanceExceeded { .. }));
    let current = manager.current_session().await.unwrap();
    assert_eq!(current.spent(), Amount::from(20));
    assert_eq!(current.transaction_count(), 1);

    manager.record_tip(FAN, "0xbob", Amount::from(25), None).await.unwrap();
    let current = manager.current_session().await.unwrap();
    assert_eq!(current.spent(), Amount::from(45));
    assert_eq!(current.transaction_count(), 2);

    let stats = manager.stats().await;
    assert_eq!(stats.total_tips, 2);
    assert_eq!(stats.total_amount, Amount::from(45));
    assert_eq!(stats.average_tip, Amount::new(dec!(22.5)));

    manager
        .record_transaction(FAN, "0xshop", Amount::from(5), None)
        .await
        .unwrap();
    assert_eq!(manager.current_session().await.unwrap().remaining(), Amount::zero());

    let receipt = coordinator.settle(session.id()).await.unwrap();
    assert_eq!(receipt.settled_entries, 3);
    assert_eq!(receipt.settled_amount, Amount::from(50));

    let ledger = manager.ledger().await;
    for tip in &ledger.tips {
        assert!(tip.is_settled());
        assert_eq!(tip.settlement.as_ref(), Some(&receipt.settlement_ref));
        assert_eq!(tip.status, TipStatus::Received);
    }
    assert_eq!(ledger.transactions.len(), 1);
    for tx in &ledger.transactions {
        assert_eq!(tx.settlement.as_ref(), Some(&receipt.settlement_ref));
        assert_eq!(tx.hash.as_deref(), Some(receipt.settlement_ref.as_str()));
    }
    let settled = manager.current_session().await.unwrap();
    assert_eq!(settled.status(), SessionStatus::Settled);
    assert!(settled.ended_at().is_some());
}

#[tokio::test]
async fn second_settle_fails_and_changes_nothing() {
    let coordinator = setup();
    let manager = coordinator.manager();
    let session = manager.open_session(FAN).await.unwrap();
    manager.record_tip(FAN, "0xalice", Amount::from(1), None).await.unwrap();

    let receipt = coordinator.settle(session.id()).await.unwrap();
    let ended_at = manager.current_session().await.unwrap().ended_at();

    let err = coordinator.settle(session.id()).await.unwrap_err();
    assert!(matches!(err, InstaTipError::AlreadySettled { .. }));
    assert!(!err.is_retriable());

    assert_eq!(manager.current_session().await.unwrap().ended_at(), ended_at);
    let ledger = manager.ledger().await;
    assert_eq!(ledger.tips[0].settlement.as_ref(), Some(&receipt.settlement_ref));
    assert_eq!(coordinator.receipts().await.len(), 1);
}

#[tokio::test]
async fn nothing_is_admitted_after_settlement() {
    let coordinator = setup();
    let manager = coordinator.manager();
    let session = manager.open_session(FAN).await.unwrap();
    coordinator.settle(session.id()).await.unwrap();

    let err = manager
        .record_transfer(TransferRequest::transaction(FAN, "0xshop", Amount::from(1)))
        .await
        .unwrap_err();
    assert_eq!(err, InstaTipError::NoActiveSession);
    assert!(manager.ledger().await.is_empty());
}

#[tokio::test]
async fn closed_session_keeps_its_end_time_through_settlement() {
    let coordinator = setup();
    let manager = coordinator.manager();
    let session = manager.open_session(FAN).await.unwrap();
    manager.record_tip(FAN, "0xalice", Amount::from(2), None).await.unwrap();

    let closed = manager.close_session().await.unwrap();
    assert_eq!(closed.status(), SessionStatus::Ended);

    coordinator.settle(session.id()).await.unwrap();
    let settled = manager.current_session().await.unwrap();
    assert_eq!(settled.status(), SessionStatus::Settled);
    assert_eq!(settled.ended_at(), closed.ended_at());
}

#[tokio::test]
async fn transfers_stay_admissible_after_failed_settlement() {
    let gateway = Arc::new(InMemoryGateway::new());
    let coordinator = SettlementCoordinator::new(SessionManager::default(), gateway.clone());
    let manager = coordinator.manager();
    let session = manager.open_session(FAN).await.unwrap();
    manager.record_tip(FAN, "0xalice", Amount::from(2), None).await.unwrap();

    gateway.fail_next(1);
    let err = coordinator.settle(session.id()).await.unwrap_err();
    assert!(matches!(err, InstaTipError::SettlementFailed { .. }));
    assert_eq!(manager.ledger().await.tips[0].settlement, None);

    manager.record_tip(FAN, "0xbob", Amount::from(3), None).await.unwrap();
    let receipt = coordinator.settle(session.id()).await.unwrap();
    assert_eq!(receipt.settled_entries, 2);
    assert_eq!(receipt.settled_amount, Amount::from(5));
}

#[tokio::test]
async fn timed_out_settlement_leaves_session_retriable() {
    let manager = SessionManager::default();
    let stalled = SettlementCoordinator::new(manager.clone(), Arc::new(StalledGateway));
    let session = manager.open_session(FAN).await.unwrap();
    manager.record_tip(FAN, "0xalice", Amount::from(2), None).await.unwrap();

    let attempt =
        tokio::time::timeout(Duration::from_millis(50), stalled.settle(session.id())).await;
    assert!(attempt.is_err());

    // the lock was released when the timed-out future was dropped
    let current = manager.current_session().await.unwrap();
    assert_eq!(current.status(), SessionStatus::Active);
    assert_eq!(manager.ledger().await.tips[0].settlement, None);

    let working = SettlementCoordinator::new(manager.clone(), Arc::new(InMemoryGateway::new()));
    let receipt = working.settle(session.id()).await.unwrap();
    assert_eq!(receipt.settled_entries, 1);
}

#[tokio::test]
async fn queries_answer_while_settlement_is_slow() {
    let manager = SessionManager::default();
    let coordinator = Arc::new(SettlementCoordinator::new(
        manager.clone(),
        Arc::new(SlowGateway(Duration::from_millis(500))),
    ));
    let session = manager.open_session(FAN).await.unwrap();
    manager.record_tip(FAN, "0xalice", Amount::from(2), None).await.unwrap();

    let settling = tokio::spawn({
        let coordinator = coordinator.clone();
        let session_id = session.id().clone();
        async move { coordinator.settle(&session_id).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let wait = Duration::from_millis(200);
    let stats = tokio::time::timeout(wait, manager.stats()).await.unwrap();
    assert_eq!(stats.total_tips, 1);
    assert!(tokio::time::timeout(wait, manager.is_session_active()).await.unwrap());

    let receipt = settling.await.unwrap().unwrap();
    assert_eq!(receipt.settlement_ref.as_str(), "0xslow1");
    assert!(!manager.is_session_active().await);
}

#[tokio::test]
async fn top_recipients_ranked_by_cumulative_amount() {
    let manager = SessionManager::default();
    manager
        .open_session_with_allowance(FAN, Some(Amount::from(100)))
        .await
        .unwrap();
    manager.record_tip(FAN, "0xshared", Amount::from(10), None).await.unwrap();
    manager.record_tip(FAN, "0xshared", Amount::from(15), None).await.unwrap();
    manager.record_tip(FAN, "0xbig", Amount::from(50), None).await.unwrap();

    let top = manager.stats().await.top_recipients;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].address, "0xbig");
    assert_eq!(top[0].amount, Amount::from(50));
    assert_eq!(top[0].count, 1);
    assert_eq!(top[1].address, "0xshared");
    assert_eq!(top[1].amount, Amount::from(25));
    assert_eq!(top[1].count, 2);
}

#[tokio::test]
async fn stats_on_fresh_session_are_empty() {
    let manager = SessionManager::default();
    manager.open_session(FAN).await.unwrap();
    assert_eq!(manager.stats().await, Statistics::default());
    assert!(manager.close_session().await.is_some());
}

#[tokio::test]
async fn close_with_no_session_is_not_an_error() {
    let manager = SessionManager::default();
    assert!(manager.close_session().await.is_none());
}
