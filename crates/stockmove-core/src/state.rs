//! Live form state.

use std::sync::Arc;

use crate::quantity::parse_quantity;
use crate::snapshot::StockSnapshot;
use crate::types::{MovementType, ProductRef};

/// Everything the form currently holds.
///
/// Owned by the form controller; the rendering layer only ever sees values
/// derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Raw value of the type control, as posted.
    pub type_value: String,
    /// Resolution of `type_value`, `None` while unresolved.
    pub movement_type: Option<MovementType>,
    pub product: Option<ProductRef>,
    /// Selected origin location id; empty means the placeholder.
    pub origin: String,
    /// Selected destination location id, only meaningful for transfers.
    pub destination: String,
    /// Quantity text as typed.
    pub quantity_raw: String,
    /// Parsed quantity, `None` when blank or invalid.
    pub quantity: Option<f64>,
    snapshot: Option<Arc<StockSnapshot>>,
}

impl FormState {
    pub fn product_id(&self) -> &str {
        self.product.as_ref().map(|p| p.id.as_str()).unwrap_or("")
    }

    pub fn has_product(&self) -> bool {
        !self.product_id().trim().is_empty()
    }

    pub fn has_origin(&self) -> bool {
        !self.origin.trim().is_empty()
    }

    pub fn has_destination(&self) -> bool {
        !self.destination.trim().is_empty()
    }

    pub fn set_quantity(&mut self, raw: impl Into<String>) {
        self.quantity_raw = raw.into();
        self.quantity = parse_quantity(&self.quantity_raw);
    }

    /// Store a resolved snapshot. Snapshots for another product are refused.
    pub fn set_snapshot(&mut self, snapshot: Arc<StockSnapshot>) -> bool {
        if !snapshot.belongs_to(self.product_id()) {
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Snapshot of the currently selected product, if one has resolved.
    pub fn snapshot(&self) -> Option<&StockSnapshot> {
        self.snapshot
            .as_deref()
            .filter(|snap| snap.belongs_to(self.product_id()))
    }

    /// Origin stock according to the current snapshot; zero when unknown.
    pub fn origin_quantity(&self) -> f64 {
        if !self.has_origin() {
            return 0.0;
        }
        self.snapshot()
            .map(|snap| snap.quantity_at(&self.origin))
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StockRow;

    fn snapshot(product: &str, qty: f64) -> Arc<StockSnapshot> {
        Arc::new(StockSnapshot::new(
            product,
            vec![StockRow::new("a", "A", Some(qty))],
        ))
    }

    #[test]
    fn snapshot_for_other_product_is_refused() {
        let mut state = FormState {
            product: Some(ProductRef::new("p1", "Filtro")),
            ..FormState::default()
        };
        assert!(!state.set_snapshot(snapshot("p2", 3.0)));
        assert!(state.snapshot().is_none());
        assert!(state.set_snapshot(snapshot("p1", 3.0)));
        assert!(state.snapshot().is_some());
    }

    #[test]
    fn snapshot_is_hidden_after_product_changes() {
        let mut state = FormState {
            product: Some(ProductRef::new("p1", "Filtro")),
            origin: "a".into(),
            ..FormState::default()
        };
        state.set_snapshot(snapshot("p1", 3.0));
        assert_eq!(state.origin_quantity(), 3.0);

        state.product = Some(ProductRef::new("p2", "Correa"));
        assert!(state.snapshot().is_none());
        assert_eq!(state.origin_quantity(), 0.0);
    }

    #[test]
    fn set_quantity_parses() {
        let mut state = FormState::default();
        state.set_quantity("2,5");
        assert_eq!(state.quantity, Some(2.5));
        state.set_quantity("x");
        assert_eq!(state.quantity, None);
        assert_eq!(state.quantity_raw, "x");
    }
}
