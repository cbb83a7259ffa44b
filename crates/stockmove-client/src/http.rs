//! HTTP transport for the stock-by-location endpoint.
//!
//! `GET <url>?producto_id=<id>` answers
//! `{"ok": bool, "stocks": [{"ubicacion_id", "ubicacion", "cantidad"}], "error"?}`.
//! Ids may come as numbers or strings and quantities as numbers or decimal
//! strings, depending on how the server serializes them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use stockmove_core::config::StockConfig;
use stockmove_core::snapshot::StockRow;

use crate::error::StockLookupError;
use crate::lookup::StockLookup;

/// Query parameter carrying the product id.
pub const PRODUCT_QUERY_PARAM: &str = "producto_id";

#[derive(Debug, Deserialize)]
struct StockResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    stocks: Vec<RawStockRow>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStockRow {
    #[serde(default)]
    ubicacion_id: Value,
    #[serde(default)]
    ubicacion: Value,
    #[serde(default)]
    cantidad: Value,
}

/// `StockLookup` backed by the inventory app's JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpStockLookup {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpStockLookup {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &StockConfig) -> Self {
        Self::new(cfg.url.clone(), cfg.request_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StockLookup for HttpStockLookup {
    async fn lookup(&self, product_id: &str) -> Result<Vec<StockRow>, StockLookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[(PRODUCT_QUERY_PARAM, product_id)])
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StockLookupError::TransportUnavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockLookupError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| StockLookupError::TransportUnavailable {
                message: e.to_string(),
            })?;
        parse_stock_response(&body)
    }
}

/// Parse the endpoint's JSON body into stock rows.
pub fn parse_stock_response(body: &str) -> Result<Vec<StockRow>, StockLookupError> {
    let parsed: StockResponse =
        serde_json::from_str(body).map_err(|e| StockLookupError::InvalidResponse {
            message: e.to_string(),
        })?;

    if !parsed.ok {
        return Err(StockLookupError::Rejected {
            message: parsed
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "ok=false".to_string()),
        });
    }

    Ok(parsed
        .stocks
        .into_iter()
        .filter_map(|raw| {
            let location_id = id_string(&raw.ubicacion_id)?;
            let label = match &raw.ubicacion {
                Value::String(s) if !s.trim().is_empty() => s.clone(),
                _ => location_id.clone(),
            };
            Some(StockRow::new(location_id, label, quantity_value(&raw.cantidad)))
        })
        .collect())
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn quantity_value(value: &Value) -> Option<f64> {
    let qty = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    qty.filter(|q| q.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_decimal_strings() {
        let body = r#"{"ok": true, "stocks": [
            {"ubicacion_id": 3, "ubicacion": "DEP-A", "cantidad": "12.000"},
            {"ubicacion_id": "7", "ubicacion": "PAN", "cantidad": 3.5}
        ]}"#;
        let rows = match parse_stock_response(body) {
            Ok(rows) => rows,
            Err(err) => panic!("parse: {err}"),
        };
        assert_eq!(
            rows,
            vec![
                StockRow::new("3", "DEP-A", Some(12.0)),
                StockRow::new("7", "PAN", Some(3.5)),
            ]
        );
    }

    #[test]
    fn rows_without_location_are_dropped_and_bad_quantities_kept_as_none() {
        let body = r#"{"ok": true, "stocks": [
            {"ubicacion": "sin id", "cantidad": 1},
            {"ubicacion_id": 4, "cantidad": "n/a"}
        ]}"#;
        let rows = match parse_stock_response(body) {
            Ok(rows) => rows,
            Err(err) => panic!("parse: {err}"),
        };
        assert_eq!(rows, vec![StockRow::new("4", "4", None)]);
    }

    #[test]
    fn not_ok_is_rejected_with_server_message() {
        let err = match parse_stock_response(r#"{"ok": false, "error": "producto inválido"}"#) {
            Ok(rows) => panic!("expected error, got {rows:?}"),
            Err(err) => err,
        };
        assert_eq!(
            err,
            StockLookupError::Rejected {
                message: "producto inválido".into()
            }
        );
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        let err = match parse_stock_response("<html>login</html>") {
            Ok(rows) => panic!("expected error, got {rows:?}"),
            Err(err) => err,
        };
        assert!(matches!(err, StockLookupError::InvalidResponse { .. }));
    }

    #[test]
    fn missing_stocks_with_ok_is_empty() {
        let rows = match parse_stock_response(r#"{"ok": true}"#) {
            Ok(rows) => rows,
            Err(err) => panic!("parse: {err}"),
        };
        assert!(rows.is_empty());
    }
}
