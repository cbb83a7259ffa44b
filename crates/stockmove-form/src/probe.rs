//! `stockmove-probe`: fetch one product's stock and print the origin
//! choices the form would offer. The form controller drives the lookup and
//! its events go to the log.

use std::collections::HashSet;
use std::sync::Arc;

use stockmove_client::client::StockClient;
use stockmove_client::http::HttpStockLookup;
use stockmove_core::config::load_config;
use stockmove_core::origin::OriginView;
use stockmove_core::quantity::format_quantity;
use stockmove_core::recent::RecentProductsStore;
use stockmove_core::registry::TypeRegistry;
use stockmove_core::types::{LocationOption, MovementType, ProductRef};

use crate::controller::{FormController, FormSetup, InitialValues, RefreshOutcome};
use crate::event::TracingEventSink;
use crate::logging::init_logging;

pub const USAGE: &str = "usage: stockmove-probe <product_id> [--type <value>] [--config <path>]";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeArgs {
    pub product_id: String,
    pub type_value: String,
    pub config: Option<String>,
}

/// Output of a probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProbeOutput {
    fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{}\n", message.into()),
            exit_code: code,
        }
    }
}

pub fn parse_args(args: &[String]) -> Result<ProbeArgs, String> {
    let mut product_id = None;
    let mut type_value = MovementType::Withdrawal.as_token().to_string();
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--type" => {
                let value = iter.next().ok_or("--type needs a value")?;
                type_value = value.clone();
            }
            "--config" => {
                let value = iter.next().ok_or("--config needs a value")?;
                config = Some(value.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            positional => {
                if product_id.is_some() {
                    return Err(format!("unexpected argument {positional}"));
                }
                product_id = Some(positional.to_string());
            }
        }
    }

    let product_id = product_id
        .filter(|p| !p.trim().is_empty())
        .ok_or("missing product_id")?;
    Ok(ProbeArgs {
        product_id,
        type_value,
        config,
    })
}

/// One line per origin option, selectable ones marked with `*`.
pub fn render_options(view: &OriginView) -> String {
    let mut out = String::new();
    for option in &view.options {
        let mark = if option.is_placeholder() { ' ' } else { '*' };
        let id = if option.is_placeholder() { "-" } else { option.id.as_str() };
        out.push_str(&format!("{mark} {id}\t{}\n", option.label));
    }
    if !view.enabled {
        out.push_str("no location holds stock for this product\n");
    }
    out
}

/// Run the probe end to end.
pub async fn run(args: &[String]) -> ProbeOutput {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(err) => return ProbeOutput::failure(2, format!("{err}\n{USAGE}")),
    };
    let (cfg, _) = match load_config(parsed.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => return ProbeOutput::failure(1, err),
    };
    if let Err(err) = init_logging(&cfg.logging) {
        return ProbeOutput::failure(1, err);
    }

    let registry = TypeRegistry::canonical();
    let Some(kind) = registry.resolve(&parsed.type_value) else {
        return ProbeOutput::failure(2, format!("unknown movement type {}", parsed.type_value));
    };

    let lookup = HttpStockLookup::from_config(&cfg.stock);
    tracing::info!(url = lookup.url(), product_id = %parsed.product_id, "probing stock");
    let client = StockClient::new(Arc::new(lookup));

    let mut controller = FormController::new(
        FormSetup::from_config(&cfg.form, vec![LocationOption::placeholder()]),
        RecentProductsStore::from_config(&cfg.recent),
        Arc::new(TracingEventSink),
    );
    let step = controller.boot(InitialValues {
        type_value: parsed.type_value.clone(),
        product: Some(ProductRef::new(
            parsed.product_id.as_str(),
            parsed.product_id.as_str(),
        )),
        ..InitialValues::default()
    });
    let Some(ticket) = step.refresh else {
        return ProbeOutput::failure(1, "no stock refresh was issued");
    };
    let view = match controller.refresh_now(ticket, &client).await {
        RefreshOutcome::Applied(view) => view,
        RefreshOutcome::Stale => return ProbeOutput::failure(1, "lookup cancelled"),
    };
    let Some(snapshot) = controller.state().snapshot() else {
        return ProbeOutput::failure(1, "no stock data for product");
    };

    let mut seen = HashSet::new();
    let total: f64 = snapshot
        .rows()
        .iter()
        .filter(|row| seen.insert(row.location_id.as_str()))
        .map(|row| snapshot.quantity_at(&row.location_id))
        .sum();

    let mut stdout = format!(
        "product {} ({}): {} location(s), total {}\n",
        parsed.product_id,
        kind,
        snapshot.rows().len(),
        format_quantity(Some(total))
    );
    stdout.push_str(&render_options(&view.origin));
    ProbeOutput {
        stdout,
        stderr: String::new(),
        exit_code: 0,
    }
}
