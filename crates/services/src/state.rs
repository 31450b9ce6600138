//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The stage a checkout attempt is in.
///
/// State transitions:
/// ```text
/// Validate ──► ReserveStock ──► PersistOrder ──► PromoteRole ──► Done
///    │              │                │
///    ▼              ▼                ▼
/// Aborted ◄───── Compensate ◄────────┘
/// ```
///
/// A failed `Validate` aborts directly; nothing was mutated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Inputs, cart and stock are being checked.
    #[default]
    Validate,

    /// Stock is being decremented line by line.
    ReserveStock,

    /// The order record is being written.
    PersistOrder,

    /// The buyer's role is being upgraded. Failure here is only a warning.
    PromoteRole,

    /// Reserved stock is being restored after a failure.
    Compensate,

    /// The order exists (terminal state).
    Done,

    /// The attempt failed and left no stock behind (terminal state).
    Aborted,
}

impl CheckoutStage {
    /// Returns true if a failure in this stage must restore stock.
    pub fn needs_compensation(&self) -> bool {
        matches!(self, CheckoutStage::ReserveStock | CheckoutStage::PersistOrder)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStage::Done | CheckoutStage::Aborted)
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Validate => "validate",
            CheckoutStage::ReserveStock => "reserve_stock",
            CheckoutStage::PersistOrder => "persist_order",
            CheckoutStage::PromoteRole => "promote_role",
            CheckoutStage::Compensate => "compensate",
            CheckoutStage::Done => "done",
            CheckoutStage::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_is_validate() {
        assert_eq!(CheckoutStage::default(), CheckoutStage::Validate);
    }

    #[test]
    fn test_needs_compensation() {
        assert!(!CheckoutStage::Validate.needs_compensation());
        assert!(CheckoutStage::ReserveStock.needs_compensation());
        assert!(CheckoutStage::PersistOrder.needs_compensation());
        assert!(!CheckoutStage::PromoteRole.needs_compensation());
        assert!(!CheckoutStage::Done.needs_compensation());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CheckoutStage::Validate.is_terminal());
        assert!(!CheckoutStage::Compensate.is_terminal());
        assert!(CheckoutStage::Done.is_terminal());
        assert!(CheckoutStage::Aborted.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutStage::ReserveStock.to_string(), "reserve_stock");
        assert_eq!(CheckoutStage::PromoteRole.to_string(), "promote_role");
    }
}
