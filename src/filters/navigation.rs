use super::query::DateFilter;
use super::selection::Selection;

/// Dashboard URL to navigate to when the filter bar is submitted.
///
/// Keys appear in a fixed order (`customer`, `model`, `station`,
/// `start_date`, `end_date`) and absent values are omitted entirely.
#[must_use]
pub fn submit_url(selection: &Selection, filter: &DateFilter) -> String {
    let mut pairs: Vec<(&'static str, String)> = Vec::with_capacity(5);
    if let Some(customer) = selection.customer() {
        pairs.push(("customer", customer.to_string()));
    }
    if let Some(model) = selection.model() {
        pairs.push(("model", model.to_string()));
    }
    if let Some(station) = selection.station() {
        pairs.push(("station", station.to_string()));
    }
    pairs.extend(filter.query_pairs());

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    tracing::debug!(?selection, ?filter, "Submitting filters");
    format!("/?{query}")
}
