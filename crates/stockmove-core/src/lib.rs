//! stockmove-core: domain types and pure logic for the stock movement form.
//!
//! Everything here is synchronous and side-effect free except the
//! recent-products storage backends. The async stock lookup lives in
//! `stockmove-client`; the state machine that ties it together lives in
//! `stockmove-form`.

pub mod config;
pub mod origin;
pub mod projection;
pub mod quantity;
pub mod recent;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod types;
pub mod validation;

/// Crate identity label.
pub fn crate_label() -> &'static str {
    "stockmove-core"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "stockmove-core");
    }

    #[test]
    fn modules_are_accessible() {
        let _ = types::MovementType::Intake;
        let _ = types::AdjustmentPolicy::default();
        let _ = config::Config::default();
        let _ = snapshot::StockSnapshot::empty("p1");
        let _ = state::FormState::default();
        let _ = validation::FieldTag::Product;
        let _ = recent::MemoryStorage::new();
    }
}
