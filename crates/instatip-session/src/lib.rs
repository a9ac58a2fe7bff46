//! InstaTip Session - bounded-allowance sessions with atomic admission
//!
//! A [`SessionManager`] opens one session at a time for its owner, admits
//! transfers against the session allowance, exposes the ledger and tip
//! statistics, and hands out a [`SettlementGuard`] to the settlement layer.
//!
//! # Invariants
//!
//! 1. No admitted transfer ever pushes `spent` over `allowance`
//! 2. A rejected transfer changes nothing (counters, ledger)
//! 3. Readers never see a ledger entry without its allowance update
//! 4. A settled session admits nothing further

pub mod config;
pub mod manager;
pub mod transfer;

pub use config::SessionConfig;
pub use manager::{SessionManager, SettlementGuard};
pub use transfer::{TransferDetails, TransferRequest};

pub use instatip_ledger::LedgerSnapshot;
