//! Movement form controller.
//!
//! The controller is the single owner of [`FormState`]. Each input returns a
//! [`Step`] with the new view and, when the type or product changed, a
//! [`RefreshTicket`]. The ticket is run outside the controller borrow, so
//! any number of fetches may be pending while input keeps arriving; only the
//! result carrying the current refresh generation is ever applied.

use std::sync::Arc;

use stockmove_client::client::{FetchOutcome, StockClient};
use stockmove_core::config::FormConfig;
use stockmove_core::origin::{compute_options, OriginView};
use stockmove_core::projection::project;
use stockmove_core::recent::RecentProductsStore;
use stockmove_core::registry::TypeRegistry;
use stockmove_core::state::FormState;
use stockmove_core::types::{AdjustmentPolicy, LocationOption, MovementType, ProductRef, TypeOption};
use stockmove_core::validation::{FieldTag, ValidationGate, ValidationReport};
use tokio_util::sync::CancellationToken;

use crate::event::{FormEvent, FormEventKind, FormEventSink};
use crate::view::{DestinationView, FormView, ProjectionView, RefreshState};

/// Static description of the form: the choices its selects offer.
#[derive(Debug, Clone, Default)]
pub struct FormSetup {
    pub type_options: Vec<TypeOption>,
    /// Location catalog; the first entry is the "no selection" placeholder.
    pub locations: Vec<LocationOption>,
    pub policy: AdjustmentPolicy,
}

impl FormSetup {
    /// Canonical setup with the policy from the `form` config section.
    pub fn from_config(cfg: &FormConfig, locations: Vec<LocationOption>) -> Self {
        Self::canonical(locations, cfg.adjustment_policy)
    }

    /// Setup using the canonical movement type choices.
    pub fn canonical(locations: Vec<LocationOption>, policy: AdjustmentPolicy) -> Self {
        let type_options = MovementType::ALL
            .iter()
            .map(|kind| TypeOption::new(kind.as_token(), kind.as_token()))
            .collect();
        Self {
            type_options,
            locations,
            policy,
        }
    }
}

/// Values the form is rendered with on page load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialValues {
    pub type_value: String,
    pub product: Option<ProductRef>,
    pub origin: String,
    pub destination: String,
    pub quantity: String,
}

impl InitialValues {
    /// Initial values for a new movement. A `tipo` query value is honoured
    /// when, upper-cased, it names one of the movement types.
    pub fn from_query(registry: &TypeRegistry, tipo: Option<&str>) -> Self {
        let type_value = tipo
            .map(|raw| raw.trim().to_uppercase())
            .and_then(|raw| registry.resolve(&raw))
            .map(|kind| {
                registry
                    .value_for(kind)
                    .unwrap_or(kind.as_token())
                    .to_string()
            })
            .unwrap_or_default();
        Self {
            type_value,
            ..Self::default()
        }
    }
}

/// A user edit of one control.
#[derive(Debug, Clone, PartialEq)]
pub enum FormInput {
    TypeChanged(String),
    /// `None` clears the product.
    ProductChanged(Option<ProductRef>),
    OriginChanged(String),
    DestinationChanged(String),
    QuantityChanged(String),
}

/// Output of a controller step.
#[derive(Debug)]
pub struct Step {
    pub view: FormView,
    /// Stock refresh to run, when the step started one.
    pub refresh: Option<RefreshTicket>,
}

/// A stock refresh issued by the controller.
///
/// Dropping a ticket without running it is allowed; the controller stays in
/// `Refreshing` until a newer refresh is issued.
#[derive(Debug)]
pub struct RefreshTicket {
    generation: u64,
    product_id: String,
    cancel: CancellationToken,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fetch the stock this refresh asked for.
    pub async fn run(self, client: &StockClient) -> RefreshResult {
        let outcome = client.fetch(&self.product_id, &self.cancel).await;
        RefreshResult {
            generation: self.generation,
            product_id: self.product_id,
            outcome,
        }
    }
}

/// Result of running a [`RefreshTicket`], to hand back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshResult {
    pub generation: u64,
    pub product_id: String,
    pub outcome: FetchOutcome,
}

/// What [`FormController::complete_refresh`] did with a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied(FormView),
    /// Superseded or cancelled; the form was left untouched.
    Stale,
}

impl RefreshOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// The values posted by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub tipo: String,
    pub producto: String,
    pub ubicacion: String,
    /// Only posted for transfers.
    pub ubicacion_destino: Option<String>,
    pub cantidad: String,
}

impl Submission {
    /// Name/value pairs in form order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            (FieldTag::MovementType.field_name(), self.tipo.as_str()),
            (FieldTag::Product.field_name(), self.producto.as_str()),
            (FieldTag::Origin.field_name(), self.ubicacion.as_str()),
        ];
        if let Some(dest) = &self.ubicacion_destino {
            fields.push((FieldTag::Destination.field_name(), dest.as_str()));
        }
        fields.push((FieldTag::Quantity.field_name(), self.cantidad.as_str()));
        fields
    }
}

/// Decision taken at submit time.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitDecision {
    /// Submission prevented; every offending field is flagged.
    Blocked(ValidationReport),
    /// Submission may proceed with these values.
    Proceed(Submission),
}

/// Stock-aware movement form controller.
pub struct FormController {
    registry: TypeRegistry,
    locations: Vec<LocationOption>,
    gate: ValidationGate,
    recent: RecentProductsStore,
    sink: Arc<dyn FormEventSink>,
    state: FormState,
    origin_view: OriginView,
    generation: u64,
    in_flight: Option<CancellationToken>,
    refresh: RefreshState,
    recent_products: Vec<ProductRef>,
    report: ValidationReport,
}

impl FormController {
    pub fn new(
        setup: FormSetup,
        recent: RecentProductsStore,
        sink: Arc<dyn FormEventSink>,
    ) -> Self {
        let gate = ValidationGate::new(setup.policy).with_locations(setup.locations.clone());
        let origin_view = OriginView::unfiltered(&setup.locations, "");
        Self {
            registry: TypeRegistry::from_options(&setup.type_options),
            locations: setup.locations,
            gate,
            recent,
            sink,
            state: FormState::default(),
            origin_view,
            generation: 0,
            in_flight: None,
            refresh: RefreshState::Idle,
            recent_products: Vec::new(),
            report: ValidationReport::default(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.refresh
    }

    /// Load the initial values and issue the first refresh.
    ///
    /// An empty type control is set to the intake choice. The origin keeps
    /// its initial value until the first snapshot arrives.
    pub fn boot(&mut self, initial: InitialValues) -> Step {
        let type_value = if initial.type_value.trim().is_empty() {
            self.registry.default_value()
        } else {
            initial.type_value
        };
        self.set_type(type_value);
        self.state.product = initial.product.filter(|p| !p.id.trim().is_empty());
        self.state.origin = initial.origin;
        self.state.destination = if self.is_transfer() {
            initial.destination
        } else {
            String::new()
        };
        self.state.set_quantity(initial.quantity);
        self.state.clear_snapshot();
        self.origin_view = OriginView::unfiltered(&self.locations, &self.state.origin);
        self.recent_products = self.recent.load();

        self.emit(FormEventKind::Boot, self.state.type_value.clone());
        tracing::debug!(
            tipo = %self.state.type_value,
            product_id = self.state.product_id(),
            "movement form booted"
        );
        let ticket = self.issue_refresh();
        self.revalidate();
        Step {
            view: self.view(),
            refresh: Some(ticket),
        }
    }

    /// Apply one control edit.
    pub fn handle(&mut self, input: FormInput) -> Step {
        let refresh = match input {
            FormInput::TypeChanged(value) => {
                self.set_type(value);
                if !self.is_transfer() {
                    self.state.destination.clear();
                }
                self.rebuild_origin_view();
                self.emit(FormEventKind::TypeChanged, self.state.type_value.clone());
                Some(self.issue_refresh())
            }
            FormInput::ProductChanged(product) => {
                let product = product.filter(|p| !p.id.trim().is_empty());
                if let Some(p) = &product {
                    self.recent_products = self.recent.record(p);
                }
                self.state.product = product;
                // The previous product's stock must not stay on screen.
                self.state.clear_snapshot();
                self.origin_view = OriginView::unfiltered(&self.locations, &self.state.origin);
                self.emit(
                    FormEventKind::ProductChanged,
                    self.state.product_id().to_string(),
                );
                Some(self.issue_refresh())
            }
            FormInput::OriginChanged(origin) => {
                self.state.origin = origin;
                self.emit(FormEventKind::OriginChanged, self.state.origin.clone());
                None
            }
            FormInput::DestinationChanged(destination) => {
                self.state.destination =
                    if !self.is_transfer() || destination == self.state.origin {
                        String::new()
                    } else {
                        destination
                    };
                self.emit(
                    FormEventKind::DestinationChanged,
                    self.state.destination.clone(),
                );
                None
            }
            FormInput::QuantityChanged(raw) => {
                self.state.set_quantity(raw);
                self.emit(FormEventKind::QuantityChanged, self.state.quantity_raw.clone());
                None
            }
        };
        self.revalidate();
        Step {
            view: self.view(),
            refresh,
        }
    }

    /// Hand back the result of a refresh ticket.
    ///
    /// Results from superseded refreshes, cancelled fetches and snapshots of
    /// another product are discarded without touching the form.
    pub fn complete_refresh(&mut self, result: RefreshResult) -> RefreshOutcome {
        if result.generation != self.generation {
            tracing::debug!(
                generation = result.generation,
                current = self.generation,
                product_id = %result.product_id,
                "discarding superseded stock refresh"
            );
            self.emit(
                FormEventKind::RefreshDiscarded,
                format!("superseded generation {}", result.generation),
            );
            return RefreshOutcome::Stale;
        }
        let snapshot = match result.outcome {
            FetchOutcome::Resolved(snapshot) => snapshot,
            FetchOutcome::Cancelled => {
                self.emit(FormEventKind::RefreshDiscarded, "cancelled");
                return RefreshOutcome::Stale;
            }
        };

        if self.state.has_product() {
            if !self.state.set_snapshot(snapshot) {
                self.emit(FormEventKind::RefreshDiscarded, "snapshot of another product");
                return RefreshOutcome::Stale;
            }
        } else {
            self.state.clear_snapshot();
        }

        self.refresh = RefreshState::Idle;
        self.in_flight = None;
        self.rebuild_origin_view();
        self.revalidate();

        tracing::debug!(
            generation = self.generation,
            product_id = self.state.product_id(),
            origins = self.origin_view.selectable_count(),
            "stock refresh applied"
        );
        self.emit(
            FormEventKind::RefreshApplied,
            format!("{} origin(s)", self.origin_view.selectable_count()),
        );
        RefreshOutcome::Applied(self.view())
    }

    /// Run `ticket` inline and apply its result.
    pub async fn refresh_now(
        &mut self,
        ticket: RefreshTicket,
        client: &StockClient,
    ) -> RefreshOutcome {
        let result = ticket.run(client).await;
        self.complete_refresh(result)
    }

    /// Authoritative check before the form is posted.
    ///
    /// An unresolved type is forced to the intake choice first. Nothing is
    /// disabled or rewritten otherwise, so the posted values are exactly
    /// what the user sees.
    pub fn submit(&mut self) -> SubmitDecision {
        if self.state.movement_type.is_none() {
            let value = self.registry.default_value();
            self.set_type(value);
            self.rebuild_origin_view();
        }
        self.revalidate();

        if !self.report.passed {
            let fields: Vec<&str> = self
                .report
                .field_errors
                .iter()
                .map(|f| f.field_name())
                .collect();
            tracing::info!(fields = ?fields, "movement submit blocked");
            self.emit(FormEventKind::SubmitBlocked, fields.join(","));
            return SubmitDecision::Blocked(self.report.clone());
        }

        let submission = Submission {
            tipo: self.state.type_value.clone(),
            producto: self.state.product_id().to_string(),
            ubicacion: self.state.origin.clone(),
            ubicacion_destino: self
                .is_transfer()
                .then(|| self.state.destination.clone()),
            cantidad: self.state.quantity_raw.clone(),
        };
        tracing::info!(
            tipo = %submission.tipo,
            producto = %submission.producto,
            "movement submit allowed"
        );
        self.emit(FormEventKind::SubmitAllowed, submission.tipo.clone());
        SubmitDecision::Proceed(submission)
    }

    /// Current render model.
    pub fn view(&self) -> FormView {
        let entered = self.state.quantity.unwrap_or(0.0);
        let projection = project(
            self.state.movement_type,
            self.state.origin_quantity(),
            entered,
        );
        FormView {
            type_value: self.state.type_value.clone(),
            movement_type: self.state.movement_type,
            product: self.state.product.clone(),
            origin: self.origin_view.clone(),
            destination: DestinationView::for_kind(
                self.state.movement_type,
                &self.state.destination,
            ),
            quantity: self.state.quantity_raw.clone(),
            projection: ProjectionView::from(projection),
            validation: self.report.clone(),
            refresh: self.refresh,
            recent_products: self.recent_products.clone(),
        }
    }

    /// Run the validation gate against the current state without side
    /// effects on the form.
    pub fn validate(&self) -> ValidationReport {
        self.gate.validate(&self.state, self.origin_view.enabled)
    }

    fn revalidate(&mut self) {
        self.report = self.validate();
    }

    /// Recompute the origin select from the snapshot already held. While the
    /// selected product's stock is still loading the whole catalog is
    /// offered and the selection is left alone.
    fn rebuild_origin_view(&mut self) {
        if self.state.has_product() && self.state.snapshot().is_none() {
            self.origin_view = OriginView::unfiltered(&self.locations, &self.state.origin);
            return;
        }
        self.origin_view = compute_options(
            self.state.movement_type,
            self.state.product_id(),
            self.state.snapshot(),
            &self.locations,
            &self.state.origin,
        );
        self.state.origin = self.origin_view.selected.clone();
    }

    fn set_type(&mut self, value: String) {
        self.state.movement_type = self.registry.resolve(&value);
        self.state.type_value = value;
    }

    fn is_transfer(&self) -> bool {
        self.state
            .movement_type
            .is_some_and(MovementType::is_transfer)
    }

    fn issue_refresh(&mut self) -> RefreshTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.refresh = RefreshState::Refreshing {
            generation: self.generation,
        };
        self.emit(
            FormEventKind::RefreshIssued,
            self.state.product_id().to_string(),
        );
        RefreshTicket {
            generation: self.generation,
            product_id: self.state.product_id().to_string(),
            cancel,
        }
    }

    fn emit(&self, kind: FormEventKind, detail: impl Into<String>) {
        self.sink.record(FormEvent::new(self.generation, kind, detail));
    }
}
