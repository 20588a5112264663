use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::LookupError;
use crate::filters::{DateFilter, Selection};
use crate::lookup::{LookupResult, LookupService};
use crate::sync::synchronizer::{Applied, FilterView, LookupRequest, LookupTicket, Synchronizer};

/// Result of one spawned lookup, routed back to the owning session.
#[derive(Debug)]
pub struct Completion {
    pub request: LookupRequest,
    pub outcome: Result<LookupResult, LookupError>,
}

/// Async driver around a [`Synchronizer`].
///
/// Lookups run as independent tokio tasks and may finish in any order.
/// Their completions come back over a channel and are applied only by the
/// session owner, which is the single writer of the synchronizer state.
pub struct FilterSession<S: LookupService + ?Sized + 'static> {
    synchronizer: Synchronizer,
    service: Arc<S>,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<S: LookupService + ?Sized + 'static> FilterSession<S> {
    #[must_use]
    pub fn new(service: Arc<S>, filter: DateFilter, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            synchronizer: Synchronizer::new(filter),
            service,
            timeout,
            tx,
            rx,
            in_flight: 0,
        }
    }

    #[must_use]
    pub fn synchronizer(&self) -> &Synchronizer {
        &self.synchronizer
    }

    #[must_use]
    pub fn view(&self) -> FilterView {
        self.synchronizer.view()
    }

    /// Number of spawned lookups whose completion has not been received yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the lookup is spawned.
    pub fn select_customer(&mut self, customer: &str) {
        if let Some(request) = self.synchronizer.on_customer_change(customer) {
            self.dispatch(request);
        }
    }

    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since the lookup is spawned.
    pub fn select_model(&mut self, model: &str) {
        if let Some(request) = self.synchronizer.on_model_change(model) {
            self.dispatch(request);
        }
    }

    pub fn select_station(&mut self, station: &str) {
        self.synchronizer.on_station_change(station);
    }

    fn dispatch(&mut self, request: LookupRequest) -> LookupTicket {
        let ticket = request.ticket;
        let service = Arc::clone(&self.service);
        let query = request.query.clone();
        let guard = CompletionGuard {
            request: Some(request),
            tx: self.tx.clone(),
        };
        let timeout = self.timeout;
        self.in_flight += 1;

        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, service.lookup(&query)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(LookupError::Timeout(timeout)),
            };
            guard.complete(outcome);
        });

        ticket
    }

    /// Wait for the next lookup to finish and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<(LookupTicket, Applied)> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight -= 1;
        let ticket = completion.request.ticket;
        let applied = self
            .synchronizer
            .apply(&completion.request, completion.outcome);
        Some((ticket, applied))
    }

    /// Apply completions until no lookup is in flight.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    /// Apply completions until `ticket` has been delivered.
    async fn settle_ticket(&mut self, ticket: LookupTicket) {
        while let Some((delivered, _)) = self.next_completion().await {
            if delivered == ticket {
                break;
            }
        }
    }

    /// Replay a selection recovered from the page URL.
    ///
    /// The customer goes through the same path as an interactive change. Once
    /// its models are in, a pre-selected model is re-selected if the service
    /// still offers it, and likewise the station once stations are in.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub async fn initialize_from_selection(&mut self, selection: &Selection) {
        tracing::debug!(?selection, "Initializing filter state");

        let Some(customer) = selection.customer() else {
            self.select_customer("");
            return;
        };
        let Some(request) = self.synchronizer.on_customer_change(customer) else {
            return;
        };
        let ticket = self.dispatch(request);
        self.settle_ticket(ticket).await;

        let Some(model) = selection.model() else {
            return;
        };
        if !self.synchronizer.model().options.contains(model) {
            tracing::debug!(model = %model, "Pre-selected model no longer offered");
            return;
        }
        let Some(request) = self.synchronizer.on_model_change(model) else {
            return;
        };
        let ticket = self.dispatch(request);
        self.settle_ticket(ticket).await;
        tracing::debug!(model = %model, "Re-selected pre-selected model");

        if let Some(station) = selection.station() {
            if self.synchronizer.station().options.contains(station) {
                self.select_station(station);
            } else {
                tracing::debug!(station = %station, "Pre-selected station no longer offered");
            }
        }
    }

    #[must_use]
    pub fn submit_url(&self) -> String {
        self.synchronizer.submit_url()
    }
}

/// Delivers exactly one completion per spawned lookup.
///
/// If the task unwinds or is dropped before finishing, the request is
/// reported as failed so the field never stays `Loading`.
struct CompletionGuard {
    request: Option<LookupRequest>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl CompletionGuard {
    fn complete(mut self, outcome: Result<LookupResult, LookupError>) {
        if let Some(request) = self.request.take() {
            // The receiver only goes away with the session itself.
            let _ = self.tx.send(Completion { request, outcome });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            tracing::warn!(
                field = ?request.ticket.field,
                seq = request.ticket.seq,
                customer = %request.query.customer,
                "Lookup task ended without a result"
            );
            let _ = self.tx.send(Completion {
                request,
                outcome: Err(LookupError::Network("lookup task aborted".to_string())),
            });
        }
    }
}
