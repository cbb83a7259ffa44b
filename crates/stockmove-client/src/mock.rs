//! Mock stock lookup for unit testing.
//!
//! Responses are scripted per product, optionally behind a delay, and every
//! call is recorded.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use stockmove_core::snapshot::StockRow;

use crate::error::StockLookupError;
use crate::lookup::StockLookup;

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    result: Result<Vec<StockRow>, StockLookupError>,
}

/// Scripted implementation of `StockLookup`.
#[derive(Default)]
pub struct MockStockLookup {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl MockStockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `product_id` immediately with `rows`.
    pub fn with_stock(self, product_id: &str, rows: Vec<StockRow>) -> Self {
        self.script(product_id, Duration::ZERO, Ok(rows))
    }

    /// Answer `product_id` with `rows` after `delay`.
    pub fn with_delayed_stock(
        self,
        product_id: &str,
        delay: Duration,
        rows: Vec<StockRow>,
    ) -> Self {
        self.script(product_id, delay, Ok(rows))
    }

    /// Fail lookups of `product_id` with `err`.
    pub fn with_error(self, product_id: &str, err: StockLookupError) -> Self {
        self.script(product_id, Duration::ZERO, Err(err))
    }

    fn script(
        self,
        product_id: &str,
        delay: Duration,
        result: Result<Vec<StockRow>, StockLookupError>,
    ) -> Self {
        let entry = Scripted { delay, result };
        match self.responses.lock() {
            Ok(mut guard) => {
                guard.insert(product_id.to_string(), entry);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(product_id.to_string(), entry);
            }
        }
        self
    }

    /// Product ids of every lookup started, in call order.
    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Product ids of lookups that ran to completion (not abandoned).
    pub fn completed(&self) -> Vec<String> {
        match self.completed.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(list: &Mutex<Vec<String>>, product_id: &str) {
        match list.lock() {
            Ok(mut guard) => guard.push(product_id.to_string()),
            Err(poisoned) => poisoned.into_inner().push(product_id.to_string()),
        }
    }

    fn scripted(&self, product_id: &str) -> Option<Scripted> {
        match self.responses.lock() {
            Ok(guard) => guard.get(product_id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(product_id).cloned(),
        }
    }
}

#[async_trait]
impl StockLookup for MockStockLookup {
    async fn lookup(&self, product_id: &str) -> Result<Vec<StockRow>, StockLookupError> {
        Self::record(&self.calls, product_id);
        let Some(scripted) = self.scripted(product_id) else {
            Self::record(&self.completed, product_id);
            return Ok(Vec::new());
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        Self::record(&self.completed, product_id);
        scripted.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_rows_are_returned_and_calls_recorded() {
        let mock = MockStockLookup::new().with_stock("p1", vec![StockRow::new("a", "A", Some(2.0))]);
        let rows = mock.lookup("p1").await;
        assert_eq!(rows, Ok(vec![StockRow::new("a", "A", Some(2.0))]));
        assert_eq!(mock.calls(), vec!["p1".to_string()]);
        assert_eq!(mock.completed(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn unknown_product_answers_empty() {
        let mock = MockStockLookup::new();
        assert_eq!(mock.lookup("zz").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn scripted_error_is_returned() {
        let mock = MockStockLookup::new().with_error(
            "p1",
            StockLookupError::HttpStatus { status: 500 },
        );
        assert_eq!(
            mock.lookup("p1").await,
            Err(StockLookupError::HttpStatus { status: 500 })
        );
    }
}
