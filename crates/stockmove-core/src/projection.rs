//! Projected origin balance after the movement.

use crate::quantity::{finite_or_zero, format_quantity};
use crate::types::MovementType;

/// Current and projected quantity at the origin location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub current: f64,
    pub after: f64,
    /// The movement would take more than the origin holds.
    pub overdraft: bool,
}

impl Projection {
    /// Display strings for the current and projected balance.
    pub fn format(&self) -> (String, String) {
        (
            format_quantity(Some(self.current)),
            format_quantity(Some(self.after)),
        )
    }
}

/// Project the origin balance.
///
/// Withdrawals and transfers subtract the entered quantity; intakes and
/// adjustments add it. An unresolved type projects no change. Non-finite
/// input counts as zero.
pub fn project(kind: Option<MovementType>, current: f64, entered: f64) -> Projection {
    let current = finite_or_zero(current);
    let entered = finite_or_zero(entered);
    let subtracts = kind.is_some_and(MovementType::subtracts);

    let after = match kind {
        Some(k) if k.subtracts() => current - entered,
        Some(_) => current + entered,
        None => current,
    };

    Projection {
        current,
        after,
        overdraft: subtracts && entered > 0.0 && after < 0.0,
    }
}
