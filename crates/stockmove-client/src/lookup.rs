//! Stock lookup trait, the transport seam of the stock client.

use async_trait::async_trait;
use stockmove_core::snapshot::StockRow;

use crate::error::StockLookupError;

/// Fetches per-location stock rows for one product.
///
/// Implementations perform exactly one request per call and do no caching;
/// dropping the returned future must abandon the request.
#[async_trait]
pub trait StockLookup: Send + Sync {
    async fn lookup(&self, product_id: &str) -> Result<Vec<StockRow>, StockLookupError>;
}
