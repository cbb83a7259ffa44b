//! stockmove-client: per-product stock lookup for the movement form.
//!
//! Provides a transport-agnostic `StockLookup` trait with implementations for:
//! - `HttpStockLookup`: the inventory app's stock-by-location JSON endpoint
//! - `MockStockLookup`: scripted responses for unit testing
//!
//! `StockClient` wraps a lookup with a process-lifetime cache and
//! cancellation, and never surfaces transport failures to its caller.

pub mod client;
pub mod error;
pub mod http;
pub mod lookup;
pub mod mock;

/// Stable crate label.
pub fn crate_label() -> &'static str {
    "stockmove-client"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "stockmove-client");
    }
}
