//! Demo command - one tipping session from open to settlement

use std::sync::Arc;

use anyhow::{bail, Context};
use instatip_session::{SessionManager, TransferRequest};
use instatip_settlement::{InMemoryGateway, SettlementCoordinator};
use instatip_types::{Amount, InstaTipError, LedgerEntry, Session, SettlementReceipt};

use crate::commands::content_scorer;
use crate::config::AppConfig;
use crate::display;

/// Tips sent during the demo: recipient, amount, attached message
const DEMO_TIPS: &[(&str, u32, &str)] = &[
    ("0xalice", 20, "Amazing step by step guide to smart contracts!"),
    ("0xbob", 40, "Love this, thanks for sharing"),
    ("0xbob", 25, "Great tutorial, learned a lot. How to do this on web3?"),
];

pub struct DemoOptions {
    pub owner: String,
    pub allowance: Option<Amount>,
    pub fail_settlements: usize,
}

pub async fn run_demo(config: &AppConfig, options: DemoOptions) -> anyhow::Result<()> {
    let token = config.session.default_token.as_str();
    let manager = SessionManager::new(config.session.clone());
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.fail_next(options.fail_settlements);
    let coordinator = SettlementCoordinator::new(manager.clone(), gateway);
    let scorer = content_scorer(config);

    display::heading("Opening Session");
    let session = manager
        .open_session_with_allowance(&options.owner, options.allowance)
        .await?;
    display::session(&session, token);

    display::heading("Tipping");
    for (to, amount, message) in DEMO_TIPS {
        let analysis = scorer.analyze(message);
        display::note(&format!(
            "\"{}\" scored {:.1}, suggested {} {}",
            message, analysis.score, analysis.suggested_tip, token
        ));

        let request = TransferRequest::tip(&options.owner, *to, Amount::from(*amount))
            .with_message(*message);
        match manager.record_transfer(request).await {
            Ok(entry) => display::done(&format!(
                "Tipped {} {} to {}",
                entry.amount(),
                token,
                entry.recipient()
            )),
            Err(e) => display::refused(&e),
        }
    }

    match manager
        .record_transaction(&options.owner, "0xcafe", Amount::from(1), None)
        .await
    {
        Ok(tx) => display::done(&format!("Paid {} {} to {}", tx.amount, tx.token, tx.to)),
        Err(e @ InstaTipError::AllowanceExceeded { .. }) => display::refused(&e),
        Err(e) => return Err(e.into()),
    }

    let current = manager
        .current_session()
        .await
        .context("session disappeared")?;
    display::session(&current, token);

    display::heading("Statistics");
    display::stats(&manager.stats().await, token);

    display::heading("Settlement");
    if let Some(closed) = manager.close_session().await {
        display::note(&format!("Session closed after {} min", closed.duration_minutes()));
    }
    let attempts = options.fail_settlements + 1;
    let receipt = settle_with_retry(&coordinator, &session, config, attempts).await?;
    display::done("Session settled");
    display::receipt(&receipt, token);

    match coordinator.settle(session.id()).await {
        Err(e @ InstaTipError::AlreadySettled { .. }) => {
            display::note(&format!("Repeat settlement refused: {}", e))
        }
        Err(e) => return Err(e.into()),
        Ok(_) => bail!("session settled twice"),
    }

    display::heading("Ledger");
    let ledger = manager.ledger().await;
    let entries = ledger
        .tips
        .into_iter()
        .map(LedgerEntry::Tip)
        .chain(ledger.transactions.into_iter().map(LedgerEntry::Transaction));
    for entry in entries {
        display::entry(&entry, token);
    }
    println!();

    Ok(())
}

async fn settle_with_retry(
    coordinator: &SettlementCoordinator,
    session: &Session,
    config: &AppConfig,
    attempts: usize,
) -> anyhow::Result<SettlementReceipt> {
    let timeout = config.settlement.timeout();
    for attempt in 1..=attempts {
        match tokio::time::timeout(timeout, coordinator.settle(session.id())).await {
            Ok(Ok(receipt)) => return Ok(receipt),
            Ok(Err(e)) if e.is_retriable() && attempt < attempts => {
                display::caution(&format!("Attempt {}: {}; retrying", attempt, e));
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => bail!("settlement timed out after {}s", timeout.as_secs()),
        }
    }
    bail!("settlement did not succeed after {} attempts", attempts)
}
