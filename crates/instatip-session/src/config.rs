//! Session configuration

use instatip_types::{Amount, InstaTipError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Limits and defaults applied when opening sessions and recording transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Allowance used when the caller does not supply one
    #[serde(default = "default_allowance")]
    pub default_allowance: Amount,

    /// Upper bound on any allowance a caller may request
    #[serde(default = "default_max_allowance")]
    pub max_allowance: Amount,

    /// Token label for transactions recorded without one
    #[serde(default = "default_token")]
    pub default_token: String,

    /// Suggested amount for a one-tap tip
    #[serde(default = "default_tip")]
    pub default_tip: Amount,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_allowance: default_allowance(),
            max_allowance: default_max_allowance(),
            default_token: default_token(),
            default_tip: default_tip(),
        }
    }
}

impl SessionConfig {
    /// Check that the defaults fit inside the configured bounds
    pub fn validate(&self) -> Result<()> {
        self.resolve_allowance(None).map(|_| ())
    }

    /// Pick the allowance for a new session, enforcing `0 <= allowance <= max_allowance`
    pub fn resolve_allowance(&self, requested: Option<Amount>) -> Result<Amount> {
        let allowance = requested.unwrap_or(self.default_allowance);
        if allowance.is_negative() {
            return Err(InstaTipError::InvalidAllowance {
                requested: allowance,
                reason: "must not be negative".to_string(),
            });
        }
        if allowance > self.max_allowance {
            return Err(InstaTipError::InvalidAllowance {
                requested: allowance,
                reason: format!("exceeds maximum of {}", self.max_allowance),
            });
        }
        Ok(allowance)
    }
}

fn default_allowance() -> Amount {
    Amount::from(50)
}

fn default_max_allowance() -> Amount {
    Amount::from(100)
}

fn default_token() -> String {
    "USDC".to_string()
}

fn default_tip() -> Amount {
    Amount::new(Decimal::new(1, 2)) // 0.01
}
