//! InstaTip Types - Domain types for bounded off-chain tipping sessions
//!
//! This crate has no dependencies on other instatip crates. It defines:
//!
//! - Identity types (SessionId, TransactionId, TipId, SettlementRef)
//! - Decimal amounts
//! - The [`Session`] entity and its admission contract
//! - Ledger entries ([`Transaction`], [`Tip`]) and derived [`Statistics`]
//! - Settlement receipts and the error taxonomy
//!
//! # Lifecycle
//!
//! ```text
//! open → admit* → (close) → settle
//! ```

pub mod identity;
pub mod amount;
pub mod session;
pub mod entry;
pub mod stats;
pub mod receipt;
pub mod error;

pub use identity::*;
pub use amount::*;
pub use session::*;
pub use entry::*;
pub use stats::*;
pub use receipt::*;
pub use error::*;
