//! Dependent selection synchronizer.
//!
//! Owns the customer/model/station [`Selection`] and the views of the two
//! dependent fields. User edits are applied immediately and may produce a
//! [`LookupRequest`]; the caller performs the lookup and hands the outcome
//! back through [`Synchronizer::apply`].
//!
//! Every request carries a [`LookupTicket`]. The synchronizer remembers the
//! latest ticket issued per field and discards any completion whose ticket
//! is older, so a slow response for a superseded selection can never
//! overwrite a newer one.

use serde::Serialize;

use crate::error::LookupError;
use crate::filters::{DateFilter, Selection, submit_url};
use crate::lookup::{LookupQuery, LookupResult};
use crate::sync::options::{FieldView, OptionSet, populate_options};

pub const SELECT_CUSTOMER_FIRST: &str = "Select customer first";
pub const SELECT_MODEL_FIRST: &str = "Select model first";
pub const LOADING_MODELS: &str = "Loading models...";
pub const LOADING_ALL_STATIONS: &str = "Loading all stations...";
pub const LOADING_STATIONS: &str = "Loading stations...";
pub const ALL_MODELS: &str = "All Models";
pub const ALL_STATIONS: &str = "All Stations";
pub const NO_MODELS: &str = "No models with data available";
pub const NO_STATIONS: &str = "No stations with data available";
pub const FAILED_MODELS: &str = "Failed to load models";
pub const FAILED_STATIONS: &str = "Failed to load stations";

/// A field whose options come from the lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentField {
    Model,
    Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupTicket {
    pub field: DependentField,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub ticket: LookupTicket,
    pub query: LookupQuery,
}

/// What [`Synchronizer::apply`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale,
}

/// Serializable snapshot of the whole filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterView {
    pub selection: Selection,
    pub filter: DateFilter,
    pub model: FieldView,
    pub station: FieldView,
}

#[derive(Debug, Clone)]
pub struct Synchronizer {
    selection: Selection,
    filter: DateFilter,
    model: FieldView,
    station: FieldView,
    next_seq: u64,
    latest_model: u64,
    latest_station: u64,
}

impl Synchronizer {
    /// Fresh filter bar: no customer, both dependents disabled.
    #[must_use]
    pub fn new(filter: DateFilter) -> Self {
        Self {
            selection: Selection::default(),
            filter,
            model: FieldView::disabled(SELECT_CUSTOMER_FIRST),
            station: FieldView::disabled(SELECT_CUSTOMER_FIRST),
            next_seq: 0,
            latest_model: 0,
            latest_station: 0,
        }
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn filter(&self) -> &DateFilter {
        &self.filter
    }

    #[must_use]
    pub fn model(&self) -> &FieldView {
        &self.model
    }

    #[must_use]
    pub fn station(&self) -> &FieldView {
        &self.station
    }

    #[must_use]
    pub fn view(&self) -> FilterView {
        FilterView {
            selection: self.selection.clone(),
            filter: self.filter.clone(),
            model: self.model.clone(),
            station: self.station.clone(),
        }
    }

    /// Whether `ticket` is still the most recent request for its field.
    #[must_use]
    pub fn is_latest(&self, ticket: LookupTicket) -> bool {
        let latest = match ticket.field {
            DependentField::Model => self.latest_model,
            DependentField::Station => self.latest_station,
        };
        ticket.seq == latest
    }

    /// Supersede any in-flight request for `field` and return the new ticket.
    fn issue(&mut self, field: DependentField) -> LookupTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        match field {
            DependentField::Model => self.latest_model = seq,
            DependentField::Station => self.latest_station = seq,
        }
        LookupTicket { field, seq }
    }

    /// The customer select changed.
    ///
    /// Clearing the customer disables both dependents without a lookup.
    /// Otherwise the model list is fetched for the new customer.
    pub fn on_customer_change(&mut self, customer: &str) -> Option<LookupRequest> {
        let model_ticket = self.issue(DependentField::Model);
        self.issue(DependentField::Station);
        self.selection = Selection::new(customer, "", "");

        if customer.is_empty() {
            self.model = FieldView::disabled(SELECT_CUSTOMER_FIRST);
            self.station = FieldView::disabled(SELECT_CUSTOMER_FIRST);
            tracing::debug!("Customer cleared - model and station disabled");
            return None;
        }

        self.model = FieldView::loading(LOADING_MODELS);
        self.station = FieldView::disabled(SELECT_MODEL_FIRST);
        tracing::debug!(customer = %customer, seq = model_ticket.seq, "Fetching models for customer");

        Some(LookupRequest {
            ticket: model_ticket,
            query: LookupQuery::new(customer, None, self.filter.clone()),
        })
    }

    /// The model select changed.
    ///
    /// An empty model lists every station of the customer; a concrete model
    /// narrows the stations to that model.
    pub fn on_model_change(&mut self, model: &str) -> Option<LookupRequest> {
        let ticket = self.issue(DependentField::Station);
        self.selection.station = None;

        let Some(customer) = self.selection.customer.clone() else {
            self.selection.model = None;
            self.station = FieldView::disabled(SELECT_CUSTOMER_FIRST);
            tracing::debug!("No customer selected - cannot filter stations");
            return None;
        };

        self.selection.model = (!model.is_empty()).then(|| model.to_string());
        let loading = if model.is_empty() {
            LOADING_ALL_STATIONS
        } else {
            LOADING_STATIONS
        };
        self.station = FieldView::loading(loading);
        tracing::debug!(
            customer = %customer,
            model = %model,
            seq = ticket.seq,
            "Fetching stations"
        );

        Some(LookupRequest {
            ticket,
            query: LookupQuery::new(customer, self.selection.model.clone(), self.filter.clone()),
        })
    }

    /// The station select changed. Stations drive no lookup.
    pub fn on_station_change(&mut self, station: &str) {
        if self.selection.customer.is_none() {
            tracing::debug!(station = %station, "Ignoring station without a customer");
            return;
        }
        self.selection.station = (!station.is_empty()).then(|| station.to_string());
    }

    /// Apply the outcome of `request` unless a newer request superseded it.
    pub fn apply(
        &mut self,
        request: &LookupRequest,
        outcome: Result<LookupResult, LookupError>,
    ) -> Applied {
        let ticket = request.ticket;
        if !self.is_latest(ticket) {
            tracing::debug!(
                field = ?ticket.field,
                seq = ticket.seq,
                customer = %request.query.customer,
                "Discarding stale lookup result"
            );
            return Applied::Stale;
        }

        match (ticket.field, outcome) {
            (DependentField::Model, Ok(result)) => {
                self.model =
                    FieldView::enabled(populate_options(&result.models, ALL_MODELS, NO_MODELS));
                self.reset_station(SELECT_MODEL_FIRST);
                tracing::debug!(
                    customer = %request.query.customer,
                    models = result.counts().models,
                    "Models loaded"
                );
            }
            (DependentField::Model, Err(e)) => {
                tracing::warn!(
                    customer = %request.query.customer,
                    error = %e,
                    "Failed to load models"
                );
                self.model = FieldView::enabled(OptionSet::placeholder_only(FAILED_MODELS));
                self.reset_station(SELECT_CUSTOMER_FIRST);
            }
            (DependentField::Station, Ok(result)) => {
                let empty_message = match &request.query.model {
                    Some(model) => format!("No stations for {model}"),
                    None => NO_STATIONS.to_string(),
                };
                self.station = FieldView::enabled(populate_options(
                    &result.stations,
                    ALL_STATIONS,
                    &empty_message,
                ));
                tracing::debug!(
                    customer = %request.query.customer,
                    model = ?request.query.model,
                    stations = result.counts().stations,
                    "Stations loaded"
                );
            }
            (DependentField::Station, Err(e)) => {
                tracing::warn!(
                    customer = %request.query.customer,
                    model = ?request.query.model,
                    error = %e,
                    "Failed to load stations"
                );
                self.station = FieldView::enabled(OptionSet::placeholder_only(FAILED_STATIONS));
            }
        }
        Applied::Applied
    }

    /// A fresh model list invalidates any model picked before it arrived,
    /// together with that model's station lookup.
    fn reset_station(&mut self, label: &str) {
        self.issue(DependentField::Station);
        self.selection.model = None;
        self.selection.station = None;
        self.station = FieldView::disabled(label);
    }

    /// URL to navigate to when the filter bar is submitted.
    #[must_use]
    pub fn submit_url(&self) -> String {
        submit_url(&self.selection, &self.filter)
    }
}
