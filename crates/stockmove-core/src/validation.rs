//! Pre-submit validation of the movement form.
//!
//! Visual only: the server remains the authority. Every rule is evaluated
//! independently so all offending fields can be flagged at once.

use std::collections::BTreeSet;

use crate::state::FormState;
use crate::types::{AdjustmentPolicy, LocationOption, MovementType};

/// Form field that can carry an error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldTag {
    Product,
    MovementType,
    Origin,
    Destination,
    Quantity,
}

impl FieldTag {
    /// Name of the posted form field.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Product => "producto",
            Self::MovementType => "tipo",
            Self::Origin => "ubicacion",
            Self::Destination => "ubicacion_destino",
            Self::Quantity => "cantidad",
        }
    }
}

impl std::fmt::Display for FieldTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Individual validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    ProductRequired,
    TypeRequired,
    OriginRequired,
    DestinationRequired,
    DistinctLocations,
    QuantityInvalid,
    InsufficientStock,
    OriginClosedToTransfers,
    DestinationClosedToTransfers,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub field: FieldTag,
    pub rule: Rule,
    pub message: String,
}

/// Result of a validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub passed: bool,
    pub field_errors: BTreeSet<FieldTag>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            passed: issues.is_empty(),
            field_errors: issues.iter().map(|i| i.field).collect(),
            issues,
        }
    }

    pub fn has_error(&self, field: FieldTag) -> bool {
        self.field_errors.contains(&field)
    }

    pub fn failed(&self, rule: Rule) -> bool {
        self.issues.iter().any(|i| i.rule == rule)
    }

    /// Messages attached to a field, in rule order.
    pub fn messages_for(&self, field: FieldTag) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.field == field)
            .map(|i| i.message.as_str())
            .collect()
    }
}

/// Stateless validation gate.
#[derive(Debug, Clone, Default)]
pub struct ValidationGate {
    policy: AdjustmentPolicy,
    locations: Vec<LocationOption>,
}

impl ValidationGate {
    pub fn new(policy: AdjustmentPolicy) -> Self {
        Self {
            policy,
            locations: Vec::new(),
        }
    }

    /// Location catalog used to check transfer permissions.
    pub fn with_locations(mut self, locations: Vec<LocationOption>) -> Self {
        self.locations = locations;
        self
    }

    pub fn policy(&self) -> AdjustmentPolicy {
        self.policy
    }

    /// Validate `state`. `origin_enabled` is the state of the origin
    /// control; a disabled control means no valid origin exists.
    pub fn validate(&self, state: &FormState, origin_enabled: bool) -> ValidationReport {
        let mut issues = Vec::new();
        let mut fail = |field: FieldTag, rule: Rule, message: &str| {
            issues.push(ValidationIssue {
                field,
                rule,
                message: message.to_string(),
            });
        };

        let kind = state.movement_type;
        let is_transfer = kind.is_some_and(MovementType::is_transfer);

        if !state.has_product() {
            fail(FieldTag::Product, Rule::ProductRequired, "Select a product.");
        }
        if kind.is_none() {
            fail(
                FieldTag::MovementType,
                Rule::TypeRequired,
                "Select a movement type.",
            );
        }
        if !state.has_origin() || !origin_enabled {
            let message = if origin_enabled {
                "Select an origin location."
            } else {
                "No location holds stock of this product."
            };
            fail(FieldTag::Origin, Rule::OriginRequired, message);
        }
        if is_transfer && !state.has_destination() {
            fail(
                FieldTag::Destination,
                Rule::DestinationRequired,
                "A transfer requires a destination location.",
            );
        }
        if is_transfer
            && state.has_origin()
            && state.has_destination()
            && state.origin == state.destination
        {
            fail(
                FieldTag::Destination,
                Rule::DistinctLocations,
                "The destination must differ from the origin.",
            );
        }

        let signed_adjustment =
            kind == Some(MovementType::Adjustment) && self.policy == AdjustmentPolicy::Signed;
        let quantity_ok = match state.quantity {
            Some(q) if q.is_finite() => {
                if signed_adjustment {
                    q != 0.0
                } else {
                    q > 0.0
                }
            }
            _ => false,
        };
        if !quantity_ok {
            let message = if signed_adjustment {
                "The adjustment cannot be 0."
            } else {
                "The quantity must be greater than 0."
            };
            fail(FieldTag::Quantity, Rule::QuantityInvalid, message);
        }

        if kind.is_some_and(MovementType::subtracts) && state.has_origin() {
            let entered = state.quantity.filter(|q| q.is_finite()).unwrap_or(0.0);
            if entered > state.origin_quantity() {
                fail(
                    FieldTag::Quantity,
                    Rule::InsufficientStock,
                    "Not enough stock at the origin location.",
                );
            }
        }

        if is_transfer {
            if self.closed_to_transfers(&state.origin) {
                fail(
                    FieldTag::Origin,
                    Rule::OriginClosedToTransfers,
                    "The origin location does not allow transfers.",
                );
            }
            if self.closed_to_transfers(&state.destination) {
                fail(
                    FieldTag::Destination,
                    Rule::DestinationClosedToTransfers,
                    "The destination location does not allow transfers.",
                );
            }
        }

        ValidationReport::from_issues(issues)
    }

    fn closed_to_transfers(&self, location_id: &str) -> bool {
        !location_id.is_empty()
            && self
                .locations
                .iter()
                .any(|loc| loc.id == location_id && !loc.allows_transfers)
    }
}
