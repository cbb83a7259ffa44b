//! Per-product stock snapshots.

use std::collections::HashMap;

/// One location row as returned by the stock lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRow {
    pub location_id: String,
    pub location_label: String,
    /// `None` when the lookup omitted the quantity or sent something unparseable.
    pub quantity: Option<f64>,
}

impl StockRow {
    pub fn new(
        location_id: impl Into<String>,
        location_label: impl Into<String>,
        quantity: Option<f64>,
    ) -> Self {
        Self {
            location_id: location_id.into(),
            location_label: location_label.into(),
            quantity,
        }
    }
}

/// Stock of one product across locations, as of one successful lookup.
///
/// Built once and never mutated; a newer lookup produces a new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSnapshot {
    product_id: String,
    rows: Vec<StockRow>,
    by_location: HashMap<String, f64>,
}

impl StockSnapshot {
    pub fn new(product_id: impl Into<String>, rows: Vec<StockRow>) -> Self {
        let mut by_location: HashMap<String, f64> = HashMap::new();
        for row in &rows {
            let qty = row
                .quantity
                .filter(|q| q.is_finite() && *q > 0.0)
                .unwrap_or(0.0);
            // Duplicate rows for one location accumulate.
            *by_location.entry(row.location_id.clone()).or_insert(0.0) += qty;
        }
        Self {
            product_id: product_id.into(),
            rows,
            by_location,
        }
    }

    /// Snapshot used whenever stock data is unavailable.
    pub fn empty(product_id: impl Into<String>) -> Self {
        Self::new(product_id, Vec::new())
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Available quantity at a location; unknown locations hold zero.
    pub fn quantity_at(&self, location_id: &str) -> f64 {
        self.by_location.get(location_id).copied().unwrap_or(0.0)
    }

    /// Whether this snapshot describes the given product.
    pub fn belongs_to(&self, product_id: &str) -> bool {
        self.product_id == product_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_location_reads_as_zero() {
        let snap = StockSnapshot::new("p1", vec![StockRow::new("a", "A", Some(10.0))]);
        assert_eq!(snap.quantity_at("a"), 10.0);
        assert_eq!(snap.quantity_at("zz"), 0.0);
    }

    #[test]
    fn invalid_and_negative_quantities_map_to_zero() {
        let snap = StockSnapshot::new(
            "p1",
            vec![
                StockRow::new("a", "A", None),
                StockRow::new("b", "B", Some(-4.0)),
                StockRow::new("c", "C", Some(f64::NAN)),
            ],
        );
        assert_eq!(snap.quantity_at("a"), 0.0);
        assert_eq!(snap.quantity_at("b"), 0.0);
        assert_eq!(snap.quantity_at("c"), 0.0);
        assert_eq!(snap.rows().len(), 3);
    }

    #[test]
    fn duplicate_rows_accumulate() {
        let snap = StockSnapshot::new(
            "p1",
            vec![
                StockRow::new("a", "A", Some(2.0)),
                StockRow::new("a", "A", Some(1.5)),
            ],
        );
        assert_eq!(snap.quantity_at("a"), 3.5);
    }

    #[test]
    fn empty_snapshot_belongs_to_product() {
        let snap = StockSnapshot::empty("p9");
        assert!(snap.is_empty());
        assert!(snap.belongs_to("p9"));
        assert!(!snap.belongs_to("p1"));
    }
}
