//! Core domain types for stock movements.

use serde::{Deserialize, Serialize};

/// Kind of stock movement recorded by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MovementType {
    Intake,
    Withdrawal,
    Adjustment,
    Transfer,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [
        Self::Intake,
        Self::Withdrawal,
        Self::Adjustment,
        Self::Transfer,
    ];

    /// Canonical form value posted by the movement form.
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Intake => "INGRESO",
            Self::Withdrawal => "EGRESO",
            Self::Adjustment => "AJUSTE",
            Self::Transfer => "TRANSFERENCIA",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::Withdrawal => "withdrawal",
            Self::Adjustment => "adjustment",
            Self::Transfer => "transfer",
        }
    }

    /// Exact, case-insensitive match against the canonical tokens and their
    /// English synonyms.
    pub fn from_token(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INGRESO" | "INTAKE" => Some(Self::Intake),
            "EGRESO" | "WITHDRAWAL" => Some(Self::Withdrawal),
            "AJUSTE" | "ADJUSTMENT" => Some(Self::Adjustment),
            "TRANSFERENCIA" | "TRANSFER" => Some(Self::Transfer),
            _ => None,
        }
    }

    /// Whether the movement takes stock out of the origin location.
    pub fn subtracts(self) -> bool {
        matches!(self, Self::Withdrawal | Self::Transfer)
    }

    pub fn is_transfer(self) -> bool {
        self == Self::Transfer
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the quantity of an adjustment is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjustmentPolicy {
    /// The quantity must be positive and is added to the origin.
    #[default]
    Unsigned,
    /// The quantity is a signed delta; only zero is rejected.
    Signed,
}

impl AdjustmentPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsigned => "unsigned",
            Self::Signed => "signed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unsigned" => Some(Self::Unsigned),
            "signed" => Some(Self::Signed),
            _ => None,
        }
    }
}

/// A selectable product with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub label: String,
}

impl ProductRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// One entry of the location catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOption {
    pub id: String,
    pub label: String,
    pub allows_transfers: bool,
}

impl LocationOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            allows_transfers: true,
        }
    }

    /// Mark the location as closed to transfers.
    pub fn without_transfers(mut self) -> Self {
        self.allows_transfers = false;
        self
    }

    /// The "no selection" entry rendered first in location selects.
    pub fn placeholder() -> Self {
        Self::new("", "---------")
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.trim().is_empty()
    }
}

/// One option of the movement-type select: the posted value and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOption {
    pub value: String,
    pub label: String,
}

impl TypeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_from_token() {
        for kind in MovementType::ALL {
            assert_eq!(MovementType::from_token(kind.as_token()), Some(kind));
        }
    }

    #[test]
    fn from_token_is_case_insensitive_and_accepts_english() {
        assert_eq!(
            MovementType::from_token("  transferencia "),
            Some(MovementType::Transfer)
        );
        assert_eq!(
            MovementType::from_token("Withdrawal"),
            Some(MovementType::Withdrawal)
        );
        assert_eq!(MovementType::from_token("salida"), None);
        assert_eq!(MovementType::from_token(""), None);
    }

    #[test]
    fn only_withdrawal_and_transfer_subtract() {
        assert!(!MovementType::Intake.subtracts());
        assert!(MovementType::Withdrawal.subtracts());
        assert!(!MovementType::Adjustment.subtracts());
        assert!(MovementType::Transfer.subtracts());
    }

    #[test]
    fn adjustment_policy_parses() {
        assert_eq!(
            AdjustmentPolicy::from_str("Signed"),
            Some(AdjustmentPolicy::Signed)
        );
        assert_eq!(
            AdjustmentPolicy::from_str("unsigned"),
            Some(AdjustmentPolicy::Unsigned)
        );
        assert_eq!(AdjustmentPolicy::from_str("both"), None);
        assert_eq!(AdjustmentPolicy::default(), AdjustmentPolicy::Unsigned);
    }

    #[test]
    fn placeholder_has_empty_id() {
        assert!(LocationOption::placeholder().is_placeholder());
        assert!(!LocationOption::new("7", "Depósito").is_placeholder());
        assert!(!LocationOption::new("7", "Depósito").without_transfers().allows_transfers);
    }
}
