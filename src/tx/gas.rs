//! Gas-limit policy applied to node estimates

use crate::error::{AccountError, AccountResult};
use serde::{Deserialize, Serialize};

/// Fixed cost of a plain value transfer
pub const SIMPLE_TRANSFER_GAS: u64 = 21_000;

pub const DEFAULT_GAS_MARGIN_PERCENT: u64 = 125;
pub const DEFAULT_GAS_CEILING: u64 = 12_400_000;

/// Bounds accepted for `margin_percent`
pub const MIN_GAS_MARGIN_PERCENT: u64 = 125;
pub const MAX_GAS_MARGIN_PERCENT: u64 = 150;

/// How an estimated gas limit is padded before signing.
///
/// An estimate equal to [`SIMPLE_TRANSFER_GAS`] is used as-is. Anything
/// above it is scaled by `margin_percent / 100`, truncating, and clamped to
/// `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasPolicy {
    pub margin_percent: u64,
    pub ceiling: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            margin_percent: DEFAULT_GAS_MARGIN_PERCENT,
            ceiling: DEFAULT_GAS_CEILING,
        }
    }
}

impl GasPolicy {
    /// Wider margin under a lower ceiling
    pub fn conservative() -> Self {
        Self {
            margin_percent: 150,
            ceiling: 7_600_000,
        }
    }

    pub fn validate(&self) -> AccountResult<()> {
        if !(MIN_GAS_MARGIN_PERCENT..=MAX_GAS_MARGIN_PERCENT).contains(&self.margin_percent) {
            return Err(AccountError::invalid_config(format!(
                "Gas margin must be between {}% and {}%, got {}%",
                MIN_GAS_MARGIN_PERCENT, MAX_GAS_MARGIN_PERCENT, self.margin_percent
            )));
        }
        if self.ceiling < SIMPLE_TRANSFER_GAS {
            return Err(AccountError::invalid_config(format!(
                "Gas ceiling {} is below the simple transfer cost",
                self.ceiling
            )));
        }
        Ok(())
    }

    /// Final gas limit for a node estimate
    pub fn apply(&self, estimate: u64) -> u64 {
        if estimate <= SIMPLE_TRANSFER_GAS {
            return estimate;
        }
        let padded = u128::from(estimate) * u128::from(self.margin_percent) / 100;
        padded.min(u128::from(self.ceiling)) as u64
    }
}
