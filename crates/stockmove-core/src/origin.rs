//! Origin location options derived from stock.
//!
//! Movements that take stock out of a location may only start from a
//! location that holds some. For those, the origin select is rebuilt from the
//! product's snapshot; for everything else the full catalog is offered.

use crate::quantity::format_quantity;
use crate::snapshot::StockSnapshot;
use crate::types::{LocationOption, MovementType};

/// A rendered origin option.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginOption {
    pub id: String,
    pub label: String,
}

impl OriginOption {
    fn from_location(location: &LocationOption) -> Self {
        Self {
            id: location.id.clone(),
            label: location.label.clone(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.trim().is_empty()
    }
}

/// Output of [`compute_options`]: what the origin select must show.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginView {
    pub options: Vec<OriginOption>,
    /// `false` when no location can serve as origin.
    pub enabled: bool,
    /// Selected origin id after reconciliation; empty means the placeholder.
    pub selected: String,
    /// Whether the options were narrowed down from stock data.
    pub filtered: bool,
}

impl OriginView {
    /// Unfiltered view over the whole catalog.
    pub fn unfiltered(all_locations: &[LocationOption], selected: &str) -> Self {
        Self {
            options: all_locations.iter().map(OriginOption::from_location).collect(),
            enabled: true,
            selected: selected.to_string(),
            filtered: false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == id)
    }

    /// Number of options that are real locations.
    pub fn selectable_count(&self) -> usize {
        self.options.iter().filter(|o| !o.is_placeholder()).count()
    }
}

/// Build the origin options for the current type, product and snapshot.
pub fn compute_options(
    kind: Option<MovementType>,
    product_id: &str,
    snapshot: Option<&StockSnapshot>,
    all_locations: &[LocationOption],
    selected: &str,
) -> OriginView {
    let filtering = kind.is_some_and(MovementType::subtracts) && !product_id.trim().is_empty();
    if !filtering {
        return OriginView::unfiltered(all_locations, selected);
    }

    let placeholder = all_locations
        .first()
        .cloned()
        .unwrap_or_else(LocationOption::placeholder);
    let mut options = vec![OriginOption::from_location(&placeholder)];

    if let Some(snap) = snapshot.filter(|s| s.belongs_to(product_id)) {
        for row in snap.rows() {
            let duplicate = options.iter().any(|o| o.id == row.location_id);
            if row.location_id.trim().is_empty() || duplicate {
                continue;
            }
            let available = snap.quantity_at(&row.location_id);
            if available <= 0.0 {
                continue;
            }
            let base = all_locations
                .iter()
                .find(|loc| loc.id == row.location_id)
                .map(|loc| loc.label.as_str())
                .unwrap_or(row.location_label.as_str());
            options.push(OriginOption {
                id: row.location_id.clone(),
                label: stock_label(base, Some(available)),
            });
        }
    }

    let enabled = options.len() > 1;
    let selected = if !selected.is_empty() && options.iter().any(|o| o.id == selected) {
        selected.to_string()
    } else {
        placeholder.id.clone()
    };

    OriginView {
        options,
        enabled,
        selected,
        filtered: true,
    }
}

/// Location label with its available quantity appended.
pub fn stock_label(base: &str, quantity: Option<f64>) -> String {
    format!("{base} (stock: {})", format_quantity(quantity))
}
