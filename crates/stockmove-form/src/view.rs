//! Render model of the movement form.
//!
//! A `FormView` is everything the page must show after a controller step.
//! It is rebuilt from the form state on every step and never read back.

use stockmove_core::origin::OriginView;
use stockmove_core::projection::Projection;
use stockmove_core::types::{MovementType, ProductRef};
use stockmove_core::validation::{FieldTag, ValidationReport};

/// Whether a stock refresh is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    /// Waiting for the refresh issued under `generation`.
    Refreshing { generation: u64 },
}

impl RefreshState {
    pub fn is_refreshing(self) -> bool {
        matches!(self, Self::Refreshing { .. })
    }
}

/// Destination select, only shown for transfers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DestinationView {
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
    pub selected: String,
}

impl DestinationView {
    pub fn for_kind(kind: Option<MovementType>, selected: &str) -> Self {
        let transfer = kind.is_some_and(MovementType::is_transfer);
        Self {
            visible: transfer,
            enabled: transfer,
            required: transfer,
            selected: if transfer {
                selected.to_string()
            } else {
                String::new()
            },
        }
    }
}

/// Current/after panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionView {
    pub current: String,
    pub after: String,
    pub overdraft: bool,
    pub values: Projection,
}

impl From<Projection> for ProjectionView {
    fn from(values: Projection) -> Self {
        let (current, after) = values.format();
        Self {
            current,
            after,
            overdraft: values.overdraft,
            values,
        }
    }
}

/// Full render model.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub type_value: String,
    pub movement_type: Option<MovementType>,
    pub product: Option<ProductRef>,
    pub origin: OriginView,
    pub destination: DestinationView,
    pub quantity: String,
    pub projection: ProjectionView,
    pub validation: ValidationReport,
    pub refresh: RefreshState,
    pub recent_products: Vec<ProductRef>,
}

impl FormView {
    /// Whether `field` must be rendered with an error flag.
    pub fn flagged(&self, field: FieldTag) -> bool {
        self.validation.has_error(field)
    }

    pub fn is_loading(&self) -> bool {
        self.refresh.is_refreshing()
    }
}
