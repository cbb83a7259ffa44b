//! stockmove-form: the stock-aware movement form controller.
//!
//! [`controller::FormController`] owns the form state and turns every input
//! into a [`view::FormView`]. Stock refreshes are handed out as tickets so
//! the caller decides where the fetch runs; results are applied only when
//! they still belong to the latest refresh.

pub mod controller;
pub mod event;
pub mod logging;
pub mod probe;
pub mod view;

/// Crate identity label.
pub fn crate_label() -> &'static str {
    "stockmove-form"
}
